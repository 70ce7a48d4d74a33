use crate::model::DisplayZone;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "commitgrid")]
#[command(about = "Date by hour-of-day commit heatmap for one or more git repositories")]
#[command(version)]
#[command(after_help = "\
Examples:
  commitgrid
  commitgrid --repo ../api --repo ../web --days 90
  commitgrid --since 2024-01-01 --until \"2 weeks ago\" --author \"^Jane\"
  commitgrid --repo ../api --html activity.html")]
pub struct Cli {
    #[arg(
        long = "repo",
        value_name = "PATH",
        help = "Repository to include (repeatable, defaults to the current repository)"
    )]
    pub repos: Vec<PathBuf>,

    #[arg(long, value_name = "N", conflicts_with = "since", help = "Only include the last N days")]
    pub days: Option<u32>,

    #[arg(long, help = "Start date (YYYY-MM-DD, RFC3339, revision, or relative like \"2 weeks ago\")")]
    pub since: Option<String>,

    #[arg(long, help = "End date, inclusive (same formats as --since)")]
    pub until: Option<String>,

    #[arg(long, value_name = "PATTERN", help = "Regular expression matched against author names")]
    pub author: Option<String>,

    #[arg(long, value_name = "FILE", help = "Also write an HTML heatmap to FILE")]
    pub html: Option<PathBuf>,

    #[arg(long, help = "Output as JSON instead of a table")]
    pub json: bool,

    #[arg(long = "tz", value_enum, default_value_t = ZoneArg::Local, help = "Time zone used to bucket commits")]
    pub zone: ZoneArg,

    #[arg(long, help = "Skip merge commits")]
    pub no_merges: bool,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto, help = "Color the terminal table")]
    pub color: ColorMode,

    #[arg(short, long, conflicts_with = "quiet", help = "Log debug details to stderr")]
    pub verbose: bool,

    #[arg(short, long, help = "Only log warnings and errors")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ZoneArg {
    /// The machine's local time zone
    Local,
    /// Coordinated universal time
    Utc,
    /// Each commit's own recorded offset (the author's wall clock)
    Original,
}

impl From<ZoneArg> for DisplayZone {
    fn from(arg: ZoneArg) -> Self {
        match arg {
            ZoneArg::Local => DisplayZone::Local,
            ZoneArg::Utc => DisplayZone::Utc,
            ZoneArg::Original => DisplayZone::Original,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Auto => console::Term::stdout().is_term(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub repos: Vec<PathBuf>,
    pub days: Option<u32>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub author: Option<String>,
    pub html: Option<PathBuf>,
    pub json: bool,
    pub zone: DisplayZone,
    pub include_merges: bool,
    pub color: bool,
    pub show_progress: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    pub fn config(&self) -> RunConfig {
        RunConfig {
            repos: self.repos.clone(),
            days: self.days,
            since: self.since.clone(),
            until: self.until.clone(),
            author: self.author.clone(),
            html: self.html.clone(),
            json: self.json,
            zone: self.zone.into(),
            include_merges: !self.no_merges,
            color: !self.json && self.color.enabled(),
            show_progress: !self.quiet,
        }
    }

    pub fn execute(self) -> Result<()> {
        crate::grid::exec(self.config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("commitgrid").chain(args.iter().copied()))
    }

    #[test]
    fn repos_are_repeatable() {
        let cli = parse(&["--repo", "a", "--repo", "b"]).unwrap();
        assert_eq!(cli.repos, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]).unwrap();
        let config = cli.config();
        assert!(config.repos.is_empty());
        assert_eq!(config.zone, DisplayZone::Local);
        assert!(config.include_merges);
        assert_eq!(cli.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn days_conflicts_with_since() {
        assert!(parse(&["--days", "7", "--since", "2024-01-01"]).is_err());
        assert!(parse(&["--days", "7", "--until", "2024-01-01"]).is_ok());
    }

    #[test]
    fn flags_map_into_config() {
        let cli = parse(&["--tz", "utc", "--no-merges", "--color", "never", "-v"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
        let config = cli.config();
        assert_eq!(config.zone, DisplayZone::Utc);
        assert!(!config.include_merges);
        assert!(!config.color);
    }

    #[test]
    fn original_zone_is_accepted() {
        let cli = parse(&["--tz", "original"]).unwrap();
        assert_eq!(cli.config().zone, DisplayZone::Original);
        assert!(parse(&["--tz", "mars"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(parse(&["-v", "-q"]).is_err());
    }
}
