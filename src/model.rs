use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

pub const HOURS_PER_DAY: u32 = 24;

/// Zone in which commit timestamps are bucketed and date inputs are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
    /// Each commit's own recorded offset.
    Original,
}

impl DisplayZone {
    pub fn normalize(&self, timestamp: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            DisplayZone::Local => timestamp.with_timezone(&Local).fixed_offset(),
            DisplayZone::Utc => timestamp.with_timezone(&Utc).fixed_offset(),
            DisplayZone::Original => timestamp,
        }
    }

    /// Interpret a wall-clock time in this zone. `Original` has no single
    /// offset, so input dates fall back to the local zone.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            DisplayZone::Utc => Some(Utc.from_utc_datetime(&naive)),
            DisplayZone::Local | DisplayZone::Original => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            DisplayZone::Utc => now.date_naive(),
            DisplayZone::Local | DisplayZone::Original => now.with_timezone(&Local).date_naive(),
        }
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayZone::Local => "local",
            DisplayZone::Utc => "utc",
            DisplayZone::Original => "original",
        };
        f.write_str(name)
    }
}

/// One logged change, already normalized to the display zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub author: String,
    pub repo: String,
}

impl CommitRecord {
    pub fn key(&self) -> DateHourKey {
        DateHourKey::from_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateHourKey {
    pub date: NaiveDate,
    pub hour: u32,
}

impl DateHourKey {
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        debug_assert!(hour < HOURS_PER_DAY);
        Self { date, hour }
    }

    pub fn from_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Self {
        use chrono::Timelike;
        Self::new(timestamp.date_naive(), timestamp.hour())
    }
}

impl fmt::Display for DateHourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00", self.date.format("%Y-%m-%d"), self.hour)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatCell {
    pub count: u32,
    pub repos: BTreeMap<String, u32>,
}

/// Date by hour commit counts. Only non-zero cells are stored; every other
/// cell between the first and last observed date reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeatmapMatrix {
    cells: BTreeMap<DateHourKey, HeatCell>,
}

impl HeatmapMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: DateHourKey, repo: &str) {
        let cell = self.cells.entry(key).or_default();
        cell.count += 1;
        *cell.repos.entry(repo.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, date: NaiveDate, hour: u32) -> u32 {
        self.cells
            .get(&DateHourKey::new(date, hour))
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn cell(&self, key: &DateHourKey) -> Option<&HeatCell> {
        self.cells.get(key)
    }

    /// Non-zero cells in (date, hour) order.
    pub fn cells(&self) -> impl Iterator<Item = (&DateHourKey, &HeatCell)> {
        self.cells.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.cells.values().map(|c| c.count as u64).sum()
    }

    pub fn max_count(&self) -> u32 {
        self.cells.values().map(|c| c.count).max().unwrap_or(0)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.cells.keys().next().map(|k| k.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.cells.keys().next_back().map(|k| k.date)
    }

    /// Every calendar date from the first to the last observed one, inclusive.
    pub fn dates(&self) -> Vec<NaiveDate> {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => first.iter_days().take_while(|d| *d <= last).collect(),
            _ => Vec::new(),
        }
    }

    pub fn hours() -> impl Iterator<Item = u32> {
        0..HOURS_PER_DAY
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCount {
    pub repo: String,
    pub commits: u64,
}

impl RepoCount {
    pub fn percentage(&self, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.commits as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusiestSlot {
    pub key: DateHourKey,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: u64,
    pub per_repo: Vec<RepoCount>,
    pub per_hour: [u64; HOURS_PER_DAY as usize],
    pub busiest: Option<BusiestSlot>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub active_days: usize,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            total: 0,
            per_repo: Vec::new(),
            per_hour: [0; HOURS_PER_DAY as usize],
            busiest: None,
            first_date: None,
            last_date: None,
            active_days: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains<Tz: TimeZone>(&self, timestamp: &DateTime<Tz>) -> bool {
        let timestamp = timestamp.with_timezone(&Utc);
        if let Some(since) = self.since {
            if timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > until {
                return false;
            }
        }
        true
    }
}

/// Run context shown alongside the grid in HTML and JSON output.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub generated_at: DateTime<Utc>,
    pub repositories: Vec<String>,
    pub range: DateRange,
    pub author: Option<String>,
    pub zone: DisplayZone,
}

impl ReportMeta {
    pub fn new(repositories: Vec<String>, zone: DisplayZone) -> Self {
        Self {
            generated_at: Utc::now(),
            repositories,
            range: DateRange::new(),
            author: None,
            zone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellOutput {
    pub date: NaiveDate,
    pub hour: u32,
    pub count: u32,
    pub repos: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repositories: Vec<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub zone: DisplayZone,
    pub dates: Vec<NaiveDate>,
    pub cells: Vec<CellOutput>,
    pub summary: Summary,
}
