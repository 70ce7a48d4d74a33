use crate::model::{BusiestSlot, CommitRecord, HeatmapMatrix, RepoCount, Summary};
use std::collections::{BTreeSet, HashMap};

/// Fold records into the date by hour matrix and its summary in one pass.
pub fn aggregate<I>(records: I) -> (HeatmapMatrix, Summary)
where
    I: IntoIterator<Item = CommitRecord>,
{
    let mut matrix = HeatmapMatrix::new();
    let mut summary = Summary::default();
    let mut repo_map: HashMap<String, u64> = HashMap::new();

    for record in records {
        let key = record.key();
        matrix.increment(key, &record.repo);
        summary.total += 1;
        summary.per_hour[key.hour as usize] += 1;
        *repo_map.entry(record.repo).or_insert(0) += 1;
    }

    let mut per_repo: Vec<RepoCount> = repo_map
        .into_iter()
        .map(|(repo, commits)| RepoCount { repo, commits })
        .collect();
    per_repo.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.repo.cmp(&b.repo)));
    summary.per_repo = per_repo;

    summary.busiest = busiest_slot(&matrix);
    summary.first_date = matrix.first_date();
    summary.last_date = matrix.last_date();
    summary.active_days = matrix
        .cells()
        .map(|(key, _)| key.date)
        .collect::<BTreeSet<_>>()
        .len();

    (matrix, summary)
}

/// Highest cell; cells are visited in (date, hour) order and only a strictly
/// larger count replaces the current best, so ties go to the earliest slot.
fn busiest_slot(matrix: &HeatmapMatrix) -> Option<BusiestSlot> {
    let mut best: Option<BusiestSlot> = None;
    for (key, cell) in matrix.cells() {
        if best.map_or(true, |b| cell.count > b.count) {
            best = Some(BusiestSlot {
                key: *key,
                count: cell.count,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateHourKey;
    use chrono::{DateTime, NaiveDate};
    use pretty_assertions::assert_eq;

    fn record(ts: &str, repo: &str) -> CommitRecord {
        CommitRecord {
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            author: "Alice".to_string(),
            repo: repo.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn two_commits_in_one_hour() {
        let (matrix, summary) = aggregate(vec![
            record("2024-01-01T09:15:00+00:00", "app"),
            record("2024-01-01T09:45:00+00:00", "app"),
        ]);

        assert_eq!(matrix.count(date(2024, 1, 1), 9), 2);
        for hour in HeatmapMatrix::hours().filter(|h| *h != 9) {
            assert_eq!(matrix.count(date(2024, 1, 1), hour), 0);
        }
        assert_eq!(summary.total, 2);
        assert_eq!(
            summary.busiest,
            Some(BusiestSlot {
                key: DateHourKey::new(date(2024, 1, 1), 9),
                count: 2
            })
        );
        assert_eq!(summary.per_hour[9], 2);
        assert_eq!(summary.active_days, 1);
    }

    #[test]
    fn empty_input_is_a_valid_outcome() {
        let (matrix, summary) = aggregate(Vec::new());
        assert!(matrix.is_empty());
        assert!(matrix.dates().is_empty());
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.busiest, None);
    }

    #[test]
    fn ties_go_to_the_earliest_date_then_hour() {
        let (_, summary) = aggregate(vec![
            record("2024-01-02T08:00:00+00:00", "app"),
            record("2024-01-01T17:00:00+00:00", "app"),
            record("2024-01-01T11:00:00+00:00", "app"),
            record("2024-01-02T03:00:00+00:00", "app"),
        ]);
        assert_eq!(summary.busiest.unwrap().key, DateHourKey::new(date(2024, 1, 1), 11));
    }

    #[test]
    fn date_axis_is_dense() {
        let (matrix, summary) = aggregate(vec![
            record("2024-02-27T10:00:00+00:00", "app"),
            record("2024-03-02T10:00:00+00:00", "app"),
        ]);
        let dates = matrix.dates();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates.first(), Some(&date(2024, 2, 27)));
        assert_eq!(dates.last(), Some(&date(2024, 3, 2)));
        assert_eq!(summary.active_days, 2);
        assert_eq!(summary.first_date, Some(date(2024, 2, 27)));
        assert_eq!(summary.last_date, Some(date(2024, 3, 2)));
    }

    #[test]
    fn repositories_are_tags_not_partitions() {
        let (matrix, summary) = aggregate(vec![
            record("2024-01-01T09:00:00+00:00", "api"),
            record("2024-01-01T09:30:00+00:00", "web"),
            record("2024-01-01T09:50:00+00:00", "web"),
            record("2024-01-03T22:00:00+00:00", "api"),
            record("2024-01-04T22:00:00+00:00", "cli"),
        ]);

        let cell = matrix.cell(&DateHourKey::new(date(2024, 1, 1), 9)).unwrap();
        assert_eq!(cell.count, 3);
        assert_eq!(cell.repos.get("web"), Some(&2));
        assert_eq!(cell.repos.get("api"), Some(&1));

        let order: Vec<(&str, u64)> = summary
            .per_repo
            .iter()
            .map(|r| (r.repo.as_str(), r.commits))
            .collect();
        assert_eq!(order, vec![("api", 2), ("web", 2), ("cli", 1)]);
        assert_eq!(summary.per_hour[22], 2);
    }
}
