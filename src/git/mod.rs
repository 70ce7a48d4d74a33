pub mod log;
pub mod repo;

pub use log::{extract, CommitLog, LogOptions};
pub use repo::{open_all, GitRepo};
