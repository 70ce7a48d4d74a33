//! Self-contained HTML heatmap. Styles are inlined and nothing is loaded from
//! elsewhere, so the file can be mailed or archived as is.

use super::output::plural;
use super::{intensity_level, LEVELS};
use crate::model::{DateHourKey, HeatmapMatrix, ReportMeta, Summary};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

const STYLE: &str = r#"
* { box-sizing: border-box; }
body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Consolas, Monaco, monospace;
  margin: 0; padding: 20px;
  background: #0d1117; color: #c9d1d9;
}
.container { max-width: 1400px; margin: 0 auto; }
h1 { color: #58a6ff; margin: 0 0 8px 0; font-size: 28px; font-weight: 600; }
.meta { color: #8b949e; margin: 0 0 20px 0; font-size: 13px; }
.panel { background: #161b22; border-radius: 8px; padding: 20px; margin-bottom: 20px; }
.heatmap { overflow-x: auto; }
table { border-collapse: collapse; }
th { padding: 4px 2px; color: #8b949e; font-weight: 500; font-size: 11px; white-space: nowrap; }
th.year { color: #58a6ff; font-size: 13px; text-align: left; border-left: 1px solid #30363d; }
th.hour { text-align: right; padding-right: 8px; }
th.total, td.total { color: #8b949e; font-size: 11px; padding-left: 8px; text-align: right; }
td { padding: 1px; text-align: center; }
.cell {
  width: 16px; height: 16px; display: inline-block; border-radius: 2px;
  position: relative; cursor: default;
}
.cell .tip {
  visibility: hidden; opacity: 0; position: absolute; z-index: 10;
  bottom: calc(100% + 6px); left: 50%; transform: translateX(-50%);
  background: #161b22; border: 1px solid #30363d; border-radius: 6px;
  padding: 8px 10px; min-width: 160px; text-align: left; font-size: 12px; line-height: 1.5;
  white-space: nowrap; pointer-events: none;
}
.cell:hover .tip { visibility: visible; opacity: 1; }
.tip b { color: #58a6ff; }
.level-0 { background-color: #161b22; border: 1px solid #21262d; }
.level-1 { background-color: #0e4429; }
.level-2 { background-color: #006d32; }
.level-3 { background-color: #26a641; }
.level-4 { background-color: #39d353; }
.stats p { margin: 8px 0; }
.stats strong { color: #58a6ff; }
.legend { display: flex; align-items: center; gap: 12px; flex-wrap: wrap; color: #8b949e; font-size: 13px; }
.legend .cell { vertical-align: middle; margin-right: 4px; }
"#;

const LEVEL_NAMES: [&str; LEVELS as usize] = ["none", "few", "some", "many", "most"];

pub fn render_html(matrix: &HeatmapMatrix, summary: &Summary, meta: &ReportMeta) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let dates = matrix.dates();
    let max = matrix.max_count();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Commit Activity by Date and Hour</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");
    html.push_str("<h1>Commit Activity by Date and Hour</h1>\n");
    let _ = writeln!(html, "<p class=\"meta\">{}</p>", escape(&describe(meta)));

    html.push_str("<div class=\"panel heatmap\">\n<table>\n<thead>\n");
    write_year_row(&mut html, &dates);
    html.push_str("<tr><th class=\"hour\"></th>");
    for date in &dates {
        let _ = write!(
            html,
            "<th title=\"{}\">{}</th>",
            date.format("%Y-%m-%d"),
            date.format("%m-%d")
        );
    }
    html.push_str("<th class=\"total\">total</th></tr>\n</thead>\n<tbody>\n");

    for hour in HeatmapMatrix::hours() {
        let _ = write!(html, "<tr class=\"hour-row\"><th class=\"hour\">{hour}</th>");
        for date in &dates {
            write_cell(&mut html, matrix, DateHourKey::new(*date, hour), max);
        }
        let _ = writeln!(
            html,
            "<td class=\"total\">{}</td></tr>",
            summary.per_hour[hour as usize]
        );
    }
    html.push_str("</tbody>\n</table>\n</div>\n");

    write_stats(&mut html, summary);
    write_legend(&mut html);

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn write_year_row(html: &mut String, dates: &[NaiveDate]) {
    if dates.is_empty() {
        return;
    }
    let mut spans: Vec<(i32, usize)> = Vec::new();
    for date in dates {
        match spans.last_mut() {
            Some((year, n)) if *year == date.year() => *n += 1,
            _ => spans.push((date.year(), 1)),
        }
    }

    html.push_str("<tr><th class=\"hour\"></th>");
    for (year, colspan) in spans {
        let _ = write!(html, "<th class=\"year\" colspan=\"{colspan}\">{year}</th>");
    }
    html.push_str("<th></th></tr>\n");
}

fn write_cell(html: &mut String, matrix: &HeatmapMatrix, key: DateHourKey, max: u32) {
    let cell = matrix.cell(&key);
    let count = cell.map(|c| c.count).unwrap_or(0);
    let level = intensity_level(count, max);

    let _ = write!(
        html,
        "<td><div class=\"cell level-{level}\" data-date=\"{}\" data-hour=\"{}\" data-count=\"{count}\">",
        key.date.format("%Y-%m-%d"),
        key.hour
    );
    let _ = write!(
        html,
        "<div class=\"tip\"><b>{key}</b><br>{count} {}",
        plural(count as u64, "commit")
    );
    if let Some(cell) = cell {
        for (repo, n) in &cell.repos {
            let _ = write!(html, "<br>{}: {n}", escape(repo));
        }
    }
    html.push_str("</div></div></td>");
}

fn write_stats(html: &mut String, summary: &Summary) {
    html.push_str("<div class=\"panel stats\">\n");
    let _ = writeln!(html, "<p>Total commits: <strong>{}</strong></p>", summary.total);

    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        let span = (last - first).num_days() + 1;
        let _ = writeln!(
            html,
            "<p>Date range: <strong>{}</strong> to <strong>{}</strong> ({} of {span} days with commits)</p>",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d"),
            summary.active_days
        );
    }

    if !summary.per_repo.is_empty() {
        html.push_str("<p>Repositories:</p>\n<ul>\n");
        for repo in &summary.per_repo {
            let _ = writeln!(
                html,
                "<li><strong>{}</strong>: {} ({:.1}%)</li>",
                escape(&repo.repo),
                repo.commits,
                repo.percentage(summary.total)
            );
        }
        html.push_str("</ul>\n");
    }

    match summary.busiest {
        Some(slot) => {
            let _ = writeln!(
                html,
                "<p>Busiest slot: <strong>{}</strong> ({} {})</p>",
                slot.key,
                slot.count,
                plural(slot.count as u64, "commit")
            );
        }
        None => html.push_str("<p>Busiest slot: <strong>none</strong></p>\n"),
    }
    html.push_str("</div>\n");
}

fn write_legend(html: &mut String) {
    html.push_str("<div class=\"panel legend\"><span>Legend:</span>");
    for (level, name) in LEVEL_NAMES.iter().enumerate() {
        let _ = write!(
            html,
            "<span><span class=\"cell level-{level}\"></span>{name}</span>"
        );
    }
    html.push_str("</div>\n");
}

fn describe(meta: &ReportMeta) -> String {
    let mut parts = vec![format!("Repositories: {}", meta.repositories.join(", "))];
    if let Some(since) = meta.range.since {
        parts.push(format!("since {}", since.format("%Y-%m-%d %H:%M UTC")));
    }
    if let Some(until) = meta.range.until {
        parts.push(format!("until {}", until.format("%Y-%m-%d %H:%M UTC")));
    }
    if let Some(author) = &meta.author {
        parts.push(format!("author ~ {author}"));
    }
    parts.push(format!("time zone: {}", meta.zone));
    parts.push(format!("generated {}", meta.generated_at.format("%Y-%m-%d %H:%M UTC")));
    parts.join(" · ")
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
