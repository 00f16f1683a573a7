// SPDX-License-Identifier: MIT

mod log;
pub mod progress;

pub use log::*;
