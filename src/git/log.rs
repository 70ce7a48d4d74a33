use super::GitRepo;
use crate::error::{GridError, Result};
use crate::model::{CommitRecord, DisplayZone};
use chrono::DateTime;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Separates the fields of one `git log` line. Author names never contain it.
const FIELD_SEPARATOR: char = '\x1f';
const LOG_FORMAT: &str = "--format=%aI%x1f%an";

/// Variables that would point git at a repository other than the one opened.
const REPOSITORY_ENV: [&str; 6] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_OBJECT_DIRECTORY",
    "GIT_ALTERNATE_OBJECT_DIRECTORIES",
    "GIT_COMMON_DIR",
];

/// Options forwarded to `git log`. Date bounds are not among them: git's
/// `--since`/`--until` look at committer dates, records carry author dates.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub include_merges: bool,
    pub zone: DisplayZone,
}

/// Raw `git log` output of one repository. Records are parsed lazily.
#[derive(Debug, Clone)]
pub struct CommitLog {
    repo: String,
    zone: DisplayZone,
    text: String,
}

impl CommitLog {
    pub fn from_text(repo: impl Into<String>, zone: DisplayZone, text: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            zone,
            text: text.into(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = CommitRecord> + '_ {
        self.text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(move |line| match parse_line(line, &self.repo, self.zone) {
                Ok(record) => Some(record),
                Err(reason) => {
                    warn!(repo = %self.repo, line, "Skipping log line: {reason}");
                    None
                }
            })
    }
}

/// Run `git log` once over all refs of `repo`.
pub fn extract(repo: &GitRepo, options: &LogOptions) -> Result<CommitLog> {
    let mut cmd = log_command(repo.path(), options);
    debug!(repo = %repo.label(), command = ?cmd, "Running git log");
    let output = cmd
        .output()
        .map_err(|e| GridError::extraction(repo.label(), format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_empty_history(&stderr) {
            debug!(repo = %repo.label(), "Repository has no commits");
            return Ok(CommitLog::from_text(repo.label(), options.zone, String::new()));
        }
        return Err(GridError::extraction(
            repo.label(),
            format!("git log exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    Ok(CommitLog::from_text(repo.label(), options.zone, text))
}

fn log_command(path: &Path, options: &LogOptions) -> Command {
    let mut cmd = Command::new("git");
    for var in REPOSITORY_ENV {
        cmd.env_remove(var);
    }
    cmd.arg("-C")
        .arg(path)
        .args(["-c", "log.showSignature=false", "log", "--all", LOG_FORMAT]);
    if !options.include_merges {
        cmd.arg("--no-merges");
    }
    cmd
}

fn is_empty_history(stderr: &str) -> bool {
    stderr.contains("does not have any commits yet")
}

pub fn parse_line(line: &str, repo: &str, zone: DisplayZone) -> std::result::Result<CommitRecord, String> {
    let (timestamp, author) = line
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| "missing field separator".to_string())?;

    let timestamp = DateTime::parse_from_rfc3339(timestamp.trim())
        .map_err(|e| format!("bad timestamp '{timestamp}': {e}"))?;

    Ok(CommitRecord {
        timestamp: zone.normalize(timestamp),
        author: author.trim_end_matches(['\r', '\n']).to_string(),
        repo: repo.to_string(),
    })
}
