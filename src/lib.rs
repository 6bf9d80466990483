pub mod benchmark;
pub mod cli;
pub mod compare;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod import;
pub mod menu;
pub mod normalize;
pub mod score;
pub mod similarity;

pub use compare::{compare, compare_with};
pub use error::{BenchError, Result};
pub use extract::{extract, extract_with};
pub use menu::{Analysis, CandidateItem, MatchResult, MatchStatus, ReferenceItem};
pub use score::score;
