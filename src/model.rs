use crate::error::{CanaiError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Field names of [`CommitMetrics`], in column order.
pub const COLUMNS: [&str; 7] = [
    "hash",
    "repository",
    "date",
    "author",
    "language",
    "added_lines",
    "removed_lines",
];

/// One changed file within one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetrics {
    pub hash: String,
    pub repository: String,
    pub date: NaiveDateTime,
    pub author: Option<String>,
    pub language: String,
    pub added_lines: u32,
    pub removed_lines: u32,
}

impl CommitMetrics {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Midnight of `day`, the normalised form stored in [`CommitMetrics::date`].
pub fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub name: String,
    pub records: Vec<CommitMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub repositories: Vec<RepositoryMetrics>,
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CanaiError::InvalidDate(format!(
                "Start date ({start}) is later than end date ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Every day of the range, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.checked_add_days(Days::new(1)))
            .take_while(move |d| *d <= end)
    }
}
