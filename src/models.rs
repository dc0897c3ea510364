use crate::errors::ValidationError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Earliest and latest calendar years a record may fall in.
pub const RECORD_YEARS: (i32, i32) = (1900, 2199);

/// One dated amount: a flight distance, a transaction delta or a daily
/// statistic. Only constructible with a finite amount and a plausible date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedRecord {
    timestamp: DateTime<Utc>,
    amount: f64,
}

impl DatedRecord {
    /// `index` is the record's position in its source document and is
    /// only used to name it in the error.
    pub fn new(
        index: usize,
        timestamp: DateTime<Utc>,
        amount: f64,
    ) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount { record: index });
        }
        let (min, max) = RECORD_YEARS;
        if !(min..=max).contains(&timestamp.year()) {
            return Err(ValidationError::OutOfRange {
                record: index,
                value: timestamp.to_rfc3339(),
                min,
                max,
            });
        }
        Ok(Self { timestamp, amount })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
}

/// Where a bucketed series stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
    /// Up to and including the period containing this date (usually today).
    Through(NaiveDate),
    /// Up to the period of the latest record.
    LastRecord,
}

/// Parallel labels and values, one entry per calendar period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub labels: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceDay {
    pub day: NaiveDate,
    pub opening: f64,
    pub closing: f64,
}

impl BalanceDay {
    pub fn delta(&self) -> f64 {
        self.closing - self.opening
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunningBalanceSeries {
    /// Oldest first, one entry per day with a nonzero net transaction.
    pub days: Vec<BalanceDay>,
    pub earliest_balance: f64,
    pub final_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub key: String,
    pub total: f64,
}

// Documents as the backend emits them.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub balance: f64,
    pub cleared: u8,
    #[serde(default)]
    pub clearance_date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trip {
    #[serde(default)]
    pub trip_status: String,
    #[serde(default)]
    pub journeys: Vec<Journey>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Journey {
    #[serde(default)]
    pub flights: Vec<Flight>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Flight {
    pub start: String,
    pub end: String,
    pub from: String,
    pub to: String,
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Date")]
    pub date: i64,
    #[serde(rename = "Distance")]
    pub distance: f64,
    #[serde(rename = "TT", default)]
    pub kind: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyStatsRow {
    pub daily_total: f64,
    pub travelled: f64,
    #[serde(default)]
    pub flights: f64,
    #[serde(default)]
    pub travellers: f64,
    #[serde(default)]
    pub grounded: f64,
    #[serde(default, alias = "share")]
    pub share: f64,
    pub date: i64,
    #[serde(default)]
    pub entries: i64,
}

/// Parses an RFC 3339 time from a document field.
pub fn parse_time(record: usize, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            record,
            value: value.to_string(),
        })
}

/// Converts epoch seconds from a document field.
pub fn epoch_time(record: usize, seconds: i64) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| ValidationError::InvalidTimestamp {
        record,
        value: seconds.to_string(),
    })
}

// Responses.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountSummary {
    pub status: String,
    pub balance: i64,
    pub in_credit: bool,
    pub clearance_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub daily: ChartData,
    pub monthly_flights: ChartData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TravellerChartsResponse {
    pub distance: ChartData,
    pub footprint: ChartData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub chart: ChartData,
    pub earliest_balance: f64,
    pub final_balance: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlightView {
    pub trip_status: String,
    pub start: String,
    pub end: String,
    pub from: String,
    pub to: String,
    pub distance: f64,
}
