use crate::error::{GridError, Result};
use chrono::{DateTime, Utc};
use gix::{discover, Repository};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
    label: String,
}

impl GitRepo {
    /// Open the repository rooted exactly at `path`, or the one enclosing the
    /// current directory if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo = match path {
            Some(p) => {
                let p = p.as_ref();
                if !p.exists() {
                    return Err(GridError::repository_not_found(p, "path does not exist"));
                }
                gix::open(p).map_err(|e| GridError::repository_not_found(p, e))?
            }
            None => {
                let cwd = std::env::current_dir()?;
                discover(&cwd).map_err(|e| GridError::repository_not_found(&cwd, e))?
            }
        };
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        let path = path.canonicalize().unwrap_or(path);
        let label = default_label(&path);

        Ok(Self { repo, path, label })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tag attached to every commit record read from this repository.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Timestamp of the commit a revision (tag, branch, id) points to.
    pub fn revision_time(&self, input: &str) -> Result<DateTime<Utc>> {
        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| GridError::invalid_filter(input, format!("not a date or revision: {e}")))?;

        let commit = id
            .object()
            .map_err(|e| GridError::invalid_filter(input, e))?
            .try_into_commit()
            .map_err(|_| GridError::invalid_filter(input, "revision is not a commit"))?;

        let secs = commit
            .time()
            .map_err(|e| GridError::invalid_filter(input, e))?
            .seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| GridError::invalid_filter(input, format!("invalid commit timestamp {secs}")))
    }
}

/// Open every path (or the current repository when none are given) and make
/// their labels unique.
pub fn open_all(paths: &[PathBuf]) -> Result<Vec<GitRepo>> {
    let mut repos = if paths.is_empty() {
        vec![GitRepo::open(None::<&Path>)?]
    } else {
        paths
            .iter()
            .map(|p| GitRepo::open(Some(p)))
            .collect::<Result<Vec<_>>>()?
    };

    let mut seen: HashMap<String, usize> = HashMap::new();
    for repo in &repos {
        *seen.entry(repo.label.clone()).or_insert(0) += 1;
    }
    for repo in &mut repos {
        if seen.get(&repo.label).copied().unwrap_or(0) > 1 {
            repo.label = repo.path.display().to_string();
        }
    }

    Ok(repos)
}

fn default_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().trim_end_matches(".git").to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}
