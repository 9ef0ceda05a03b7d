use crate::error::AppError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Granularity of a Tibber time-series query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Annual,
    Monthly,
    Daily,
    Hourly,
}

impl Resolution {
    /// Fixed fetch and fold order
    pub const ALL: [Resolution; 4] = [
        Resolution::Annual,
        Resolution::Monthly,
        Resolution::Daily,
        Resolution::Hourly,
    ];

    /// Number of nodes requested at this resolution
    pub fn node_count(self) -> u32 {
        match self {
            Resolution::Annual => 100,
            Resolution::Monthly => 12,
            Resolution::Daily => 31,
            Resolution::Hourly => 24,
        }
    }

    pub fn as_graphql(self) -> &'static str {
        match self {
            Resolution::Annual => "ANNUAL",
            Resolution::Monthly => "MONTHLY",
            Resolution::Daily => "DAILY",
            Resolution::Hourly => "HOURLY",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_graphql())
    }
}

/// Summed consumption and production for one resolution or the overall total
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub consumption: f64,
    pub production: f64,
}

impl MetricRecord {
    pub fn new(consumption: f64, production: f64) -> Self {
        Self {
            consumption,
            production,
        }
    }
}

impl Add for MetricRecord {
    type Output = MetricRecord;

    fn add(self, rhs: MetricRecord) -> MetricRecord {
        MetricRecord {
            consumption: self.consumption + rhs.consumption,
            production: self.production + rhs.production,
        }
    }
}

impl AddAssign for MetricRecord {
    fn add_assign(&mut self, rhs: MetricRecord) {
        *self = *self + rhs;
    }
}

impl Sum for MetricRecord {
    fn sum<I: Iterator<Item = MetricRecord>>(iter: I) -> MetricRecord {
        iter.fold(MetricRecord::default(), Add::add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateResult {
    pub status: StatusCode,
    pub totals: MetricRecord,
}

/// Which of the returned homes to summarize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeSelection {
    /// Use the first home, ignore any others
    #[default]
    First,
    /// Require exactly one home
    Single,
}

impl FromStr for HomeSelection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(HomeSelection::First),
            "single" => Ok(HomeSelection::Single),
            other => Err(AppError::Config(format!(
                "Unknown home selection '{}', expected 'first' or 'single'",
                other
            ))),
        }
    }
}
