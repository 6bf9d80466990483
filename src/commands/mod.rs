//! Command implementations for the mbench CLI

mod bench;
mod dish;
mod history;
mod misc;

pub use bench::*;
pub use dish::*;
pub use history::*;
pub use misc::*;
