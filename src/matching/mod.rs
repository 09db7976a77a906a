//! Filename-based matching between a source and a target forest.

mod matcher;

pub use matcher::{MatchSet, match_forests};
