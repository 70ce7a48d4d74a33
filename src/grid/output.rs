use super::intensity_level;
use crate::error::Result;
use crate::model::{CellOutput, GridOutput, HeatmapMatrix, ReportMeta, Summary, SCHEMA_VERSION};
use chrono::{Datelike, NaiveDate};
use console::{style, Style};
use std::fmt::Write;

/// ANSI 256 greens for levels 1..=4.
const LEVEL_COLORS: [u8; 4] = [22, 28, 34, 40];
const HOUR_LABEL_WIDTH: usize = 4;
const MIN_CELL_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalStyle {
    /// Tint cells by intensity and leave empty cells blank. Without color,
    /// empty cells print as `0`.
    pub color: bool,
}

impl TerminalStyle {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }
}

/// Hour rows (0-23) by date columns, a per-hour total column, then the summary.
pub fn render_terminal(matrix: &HeatmapMatrix, summary: &Summary, term: TerminalStyle) -> String {
    let mut out = String::new();
    let bold = Style::new().bold().force_styling(term.color);
    let dim = Style::new().dim().force_styling(term.color);

    if matrix.is_empty() {
        let _ = writeln!(out, "{}", bold.apply_to("No commits matched"));
        write_summary(&mut out, summary, &bold);
        return out;
    }

    let dates = matrix.dates();
    let max = matrix.max_count();
    let width = MIN_CELL_WIDTH.max(digits(max as u64));
    let total_width = digits(summary.total).max("total".len());

    let _ = writeln!(out, "{}", bold.apply_to("Commit Activity by Date and Hour"));
    if spans_years(&dates) {
        let _ = write!(out, "{:w$}", "", w = HOUR_LABEL_WIDTH);
        for (i, date) in dates.iter().enumerate() {
            let label = if i == 0 || (date.month() == 1 && date.day() == 1) {
                date.year().to_string()
            } else {
                String::new()
            };
            let _ = write!(out, " {}", dim.apply_to(format!("{label:>width$}")));
        }
        out.push('\n');
    }

    let _ = write!(out, "{:w$}", "hour", w = HOUR_LABEL_WIDTH);
    for date in &dates {
        let _ = write!(out, " {:>width$}", date.format("%m-%d").to_string());
    }
    let _ = writeln!(out, "  {:>total_width$}", "total");

    for hour in HeatmapMatrix::hours() {
        let _ = write!(out, "{hour:>w$}", w = HOUR_LABEL_WIDTH);
        for date in &dates {
            let count = matrix.count(*date, hour);
            out.push(' ');
            out.push_str(&cell_text(count, max, width, term));
        }
        let _ = writeln!(
            out,
            "  {}",
            dim.apply_to(format!("{:>total_width$}", summary.per_hour[hour as usize]))
        );
    }

    out.push('\n');
    write_summary(&mut out, summary, &bold);
    out
}

fn cell_text(count: u32, max: u32, width: usize, term: TerminalStyle) -> String {
    if !term.color {
        return format!("{count:>width$}");
    }
    if count == 0 {
        return " ".repeat(width);
    }
    let color = LEVEL_COLORS[(intensity_level(count, max) - 1) as usize];
    Style::new()
        .color256(color)
        .force_styling(true)
        .apply_to(format!("{count:>width$}"))
        .to_string()
}

fn write_summary(out: &mut String, summary: &Summary, bold: &Style) {
    let _ = writeln!(out, "Total commits: {}", bold.apply_to(summary.total));

    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        let span = (last - first).num_days() + 1;
        let _ = writeln!(
            out,
            "Date range: {} to {} ({} of {} days with commits)",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d"),
            summary.active_days,
            span
        );
    }

    if !summary.per_repo.is_empty() {
        let _ = writeln!(out, "Repositories:");
        for repo in &summary.per_repo {
            let _ = writeln!(
                out,
                "  {}: {} ({:.1}%)",
                repo.repo,
                repo.commits,
                repo.percentage(summary.total)
            );
        }
    }

    match summary.busiest {
        Some(slot) => {
            let _ = writeln!(
                out,
                "Busiest slot: {} ({} {})",
                bold.apply_to(slot.key),
                slot.count,
                plural(slot.count as u64, "commit")
            );
        }
        None => {
            let _ = writeln!(out, "Busiest slot: none");
        }
    }
}

pub fn render_json(matrix: &HeatmapMatrix, summary: &Summary, meta: &ReportMeta) -> Result<String> {
    let output = GridOutput {
        version: SCHEMA_VERSION,
        generated_at: meta.generated_at,
        repositories: meta.repositories.clone(),
        since: meta.range.since,
        until: meta.range.until,
        author: meta.author.clone(),
        zone: meta.zone,
        dates: matrix.dates(),
        cells: matrix
            .cells()
            .map(|(key, cell)| CellOutput {
                date: key.date,
                hour: key.hour,
                count: cell.count,
                repos: cell.repos.clone(),
            })
            .collect(),
        summary: summary.clone(),
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

pub(crate) fn plural(n: u64, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn digits(n: u64) -> usize {
    n.to_string().len()
}

fn spans_years(dates: &[NaiveDate]) -> bool {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => first.year() != last.year(),
        _ => false,
    }
}

/// Header line printed before the grid when a range filter is active.
pub fn filter_banner(meta: &ReportMeta) -> Option<String> {
    let fmt = |d: chrono::DateTime<chrono::Utc>| d.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let range = match (meta.range.since, meta.range.until) {
        (Some(since), Some(until)) => Some(format!("Filtering commits from {} to {}", fmt(since), fmt(until))),
        (Some(since), None) => Some(format!("Filtering commits since {}", fmt(since))),
        (None, Some(until)) => Some(format!("Filtering commits until {}", fmt(until))),
        (None, None) => None,
    };
    let author = meta
        .author
        .as_ref()
        .map(|a| format!("Author matches {}", style(a).cyan()));

    match (range, author) {
        (Some(r), Some(a)) => Some(format!("{r}\n{a}")),
        (r, a) => r.or(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::aggregate;
    use crate::model::{CommitRecord, DateRange, DisplayZone};
    use chrono::DateTime;

    fn record(ts: &str, repo: &str) -> CommitRecord {
        CommitRecord {
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            author: "Alice".to_string(),
            repo: repo.to_string(),
        }
    }

    fn hour_rows(text: &str) -> Vec<&str> {
        text.lines()
            .skip_while(|l| !l.starts_with("hour"))
            .skip(1)
            .take_while(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn always_renders_24_hour_rows() {
        let (matrix, summary) = aggregate(vec![record("2024-01-01T09:15:00+00:00", "app")]);
        let text = render_terminal(&matrix, &summary, TerminalStyle::plain());
        let rows = hour_rows(&text);
        assert_eq!(rows.len(), 24);
        for (hour, row) in rows.iter().enumerate() {
            assert_eq!(row.split_whitespace().next(), Some(hour.to_string().as_str()));
        }
    }

    #[test]
    fn plain_cells_show_raw_counts() {
        let (matrix, summary) = aggregate(vec![
            record("2024-01-01T09:15:00+00:00", "app"),
            record("2024-01-01T09:45:00+00:00", "app"),
            record("2024-01-03T23:00:00+00:00", "app"),
        ]);
        let text = render_terminal(&matrix, &summary, TerminalStyle::plain());
        let rows = hour_rows(&text);

        let nine: Vec<&str> = rows[9].split_whitespace().collect();
        assert_eq!(nine, vec!["9", "2", "0", "0", "2"]);
        let last: Vec<&str> = rows[23].split_whitespace().collect();
        assert_eq!(last, vec!["23", "0", "0", "1", "1"]);

        assert!(text.contains("01-01"));
        assert!(text.contains("01-02"));
        assert!(text.contains("Total commits: 3"));
        assert!(text.contains("Busiest slot: 2024-01-01 09:00 (2 commits)"));
        assert!(text.contains("app: 3 (100.0%)"));
        assert!(text.contains("2 of 3 days with commits"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn colored_cells_blank_out_zeros() {
        let (matrix, summary) = aggregate(vec![record("2024-01-01T09:15:00+00:00", "app")]);
        let text = render_terminal(&matrix, &summary, TerminalStyle::colored());
        assert!(text.contains("\u{1b}[38;5;40m"));
        let plain = console::strip_ansi_codes(&text);
        let rows: Vec<&str> = plain.lines().filter(|l| l.starts_with("   0")).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].split_whitespace().collect::<Vec<_>>(), vec!["0", "0"]);
    }

    #[test]
    fn empty_matrix_reports_none() {
        let (matrix, summary) = aggregate(Vec::new());
        let text = render_terminal(&matrix, &summary, TerminalStyle::plain());
        assert!(text.contains("No commits matched"));
        assert!(text.contains("Total commits: 0"));
        assert!(text.contains("Busiest slot: none"));
    }

    #[test]
    fn year_row_appears_across_new_year() {
        let (matrix, summary) = aggregate(vec![
            record("2023-12-31T10:00:00+00:00", "app"),
            record("2024-01-01T10:00:00+00:00", "app"),
        ]);
        let text = render_terminal(&matrix, &summary, TerminalStyle::plain());
        assert!(text.contains("2023"));
        assert!(text.contains("2024"));
    }

    #[test]
    fn json_lists_non_zero_cells() {
        let (matrix, summary) = aggregate(vec![
            record("2024-01-01T09:15:00+00:00", "app"),
            record("2024-01-01T09:45:00+00:00", "lib"),
        ]);
        let meta = ReportMeta::new(vec!["app".into(), "lib".into()], DisplayZone::Utc);
        let json = render_json(&matrix, &summary, &meta).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(v["version"], SCHEMA_VERSION);
        assert_eq!(v["zone"], "utc");
        assert_eq!(v["cells"].as_array().unwrap().len(), 1);
        assert_eq!(v["cells"][0]["count"], 2);
        assert_eq!(v["cells"][0]["repos"]["lib"], 1);
        assert_eq!(v["summary"]["total"], 2);
        assert_eq!(v["summary"]["busiest"]["key"]["hour"], 9);
    }

    #[test]
    fn banner_mentions_active_filters() {
        let mut meta = ReportMeta::new(vec!["app".into()], DisplayZone::Utc);
        assert!(filter_banner(&meta).is_none());
        meta.author = Some("Alice".into());
        assert!(filter_banner(&meta).unwrap().contains("Alice"));

        meta.author = None;
        meta.range = DateRange::new().with_since(DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&chrono::Utc));
        assert_eq!(
            filter_banner(&meta).unwrap(),
            "Filtering commits since 2024-01-01T00:00:00Z"
        );
    }
}
