use super::output::filter_banner;
use super::{aggregate, render_html, render_json, render_terminal, TerminalStyle};
use crate::cli::RunConfig;
use crate::dates::{self, Bound};
use crate::error::{GridError, Result};
use crate::filter::CommitFilter;
use crate::git::{extract, open_all, CommitLog, GitRepo, LogOptions};
use crate::model::{DisplayZone, ReportMeta};
use anyhow::Context;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub fn exec(config: RunConfig) -> anyhow::Result<()> {
    let now = Utc::now();

    // Cheap checks first so a typo never costs a history walk.
    let author = config.author.as_deref();
    CommitFilter::new(Default::default(), author).context("Invalid --author pattern")?;

    let repos = open_all(&config.repos).context("Failed to open git repository")?;

    let since = match (config.days, config.since.as_deref()) {
        (Some(days), _) => Some(dates::days_ago(days, now)?),
        (None, Some(input)) => Some(resolve_bound(input, Bound::Since, config.zone, now, &repos)?),
        (None, None) => None,
    };
    let until = config
        .until
        .as_deref()
        .map(|input| resolve_bound(input, Bound::Until, config.zone, now, &repos))
        .transpose()?;
    let range = dates::make_range(since, until).context("Failed to resolve date range")?;
    let filter = CommitFilter::new(range, author).context("Invalid filter")?;
    debug!(?filter, "Filters resolved");

    let options = LogOptions {
        include_merges: config.include_merges,
        zone: config.zone,
    };

    let mut logs: Vec<CommitLog> = Vec::with_capacity(repos.len());
    for repo in &repos {
        logs.push(read_log(repo, &options, config.show_progress)?);
    }

    let (matrix, summary) = aggregate(filter.apply(logs.iter().flat_map(|log| log.records())));
    info!(commits = summary.total, repositories = repos.len(), "Aggregated commit history");

    let meta = ReportMeta {
        generated_at: now,
        repositories: repos.iter().map(|r| r.label().to_string()).collect(),
        range: filter.range().clone(),
        author: filter.author_pattern().map(str::to_string),
        zone: config.zone,
    };

    if config.json {
        println!("{}", render_json(&matrix, &summary, &meta)?);
    } else {
        if let Some(banner) = filter_banner(&meta) {
            println!("{banner}");
        }
        let style = if config.color {
            TerminalStyle::colored()
        } else {
            TerminalStyle::plain()
        };
        print!("{}", render_terminal(&matrix, &summary, style));
    }

    if let Some(path) = &config.html {
        write_output(path, &render_html(&matrix, &summary, &meta))
            .context("Failed to write HTML heatmap")?;
        info!(path = %path.display(), "HTML heatmap written");
    }

    Ok(())
}

/// Date expression first, then a revision in the first repository.
fn resolve_bound(
    input: &str,
    bound: Bound,
    zone: DisplayZone,
    now: DateTime<Utc>,
    repos: &[GitRepo],
) -> Result<DateTime<Utc>> {
    if let Some(instant) = dates::try_resolve_instant(input, bound, zone, now)? {
        return Ok(instant);
    }
    match repos.first() {
        Some(repo) => repo.revision_time(input),
        None => dates::resolve_instant(input, bound, zone, now),
    }
}

fn read_log(repo: &GitRepo, options: &LogOptions, show_progress: bool) -> anyhow::Result<CommitLog> {
    let pb = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };
    pb.set_message(format!("Reading history of {}", repo.label()));

    let result = extract(repo, options);
    pb.finish_and_clear();

    let log = result.with_context(|| format!("Failed to read history of {}", repo.path().display()))?;
    info!(repo = %repo.label(), path = %repo.path().display(), "Read commit history");
    Ok(log)
}

pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| GridError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
