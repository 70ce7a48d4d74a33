use crate::error::{GridError, Result};
use crate::model::{CommitRecord, DateRange};
use regex::Regex;

/// Time range and author predicate, validated before any log is read.
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    range: DateRange,
    author: Option<Regex>,
}

impl CommitFilter {
    pub fn new(range: DateRange, author_pattern: Option<&str>) -> Result<Self> {
        let author = author_pattern
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| GridError::invalid_filter(pattern, e))
            })
            .transpose()?;

        Ok(Self { range, author })
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn author_pattern(&self) -> Option<&str> {
        self.author.as_ref().map(|re| re.as_str())
    }

    pub fn matches(&self, record: &CommitRecord) -> bool {
        if !self.range.contains(&record.timestamp) {
            return false;
        }
        match &self.author {
            Some(re) => re.is_match(&record.author),
            None => true,
        }
    }

    pub fn apply<'a, I>(&'a self, records: I) -> impl Iterator<Item = CommitRecord> + 'a
    where
        I: IntoIterator<Item = CommitRecord>,
        I::IntoIter: 'a,
    {
        records.into_iter().filter(move |r| self.matches(r))
    }
}
