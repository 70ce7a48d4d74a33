//! Commit activity heatmaps: when, by date and hour of day, commits landed
//! across one or more git repositories.

pub mod cli;
pub mod dates;
pub mod error;
pub mod filter;
pub mod git;
pub mod grid;
pub mod model;

pub use error::{GridError, Result};
