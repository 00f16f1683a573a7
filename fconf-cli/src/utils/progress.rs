// SPDX-License-Identifier: MIT

use indicatif::{ProgressBar, ProgressStyle};

/// Case-count bar on stderr; hidden when quiet or not attached to a terminal.
pub fn case_progress(total: usize, hidden: bool) -> anyhow::Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.white}] {pos}/{len} {msg}")?
            .progress_chars("█░░"),
    );
    Ok(pb)
}
