use crate::category::{categorize, Category};
use crate::error::DashboardError;
use crate::table::RawTable;
use crate::utils::*;
use chrono::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
pub mod category;
pub mod dashboard;
pub mod error;
pub mod observability;
pub mod plot;
pub mod report;
pub mod table;
pub mod utils;

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
// keep in sync with the serde renames of RawReading
pub const COLUMN_TIMESTAMP: &str = "Data/Hora";
pub const COLUMN_ENERGY: &str = "Consumo em kWh";
pub const COLUMN_COST: &str = "Custo Total";
pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_TIMESTAMP, COLUMN_ENERGY, COLUMN_COST];
pub const PREVIEW_ROWS: usize = 5;

/// An aggregate: (key, reduced value) pairs ordered by key.
pub type Aggregate<K> = Vec<(K, f64)>;

/// Naive formats tried in order after RFC 3339.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a timestamp written in one of the common ISO-like forms.
/// Timestamps with an offset keep their local wall-clock time.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    let mut last_err = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => return Ok(dt.naive_local()),
        Err(e) => e,
    };
    for fmt in DATETIME_FORMATS.iter() {
        match NaiveDateTime::parse_from_str(s, fmt) {
            Ok(dt) => return Ok(dt),
            Err(e) => last_err = e,
        }
    }
    for fmt in DATE_FORMATS.iter() {
        match NaiveDate::parse_from_str(s, fmt) {
            Ok(d) => return Ok(d.and_time(NaiveTime::MIN)),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}

/// One row of the required columns, as found in the file.
/// The renames must match COLUMN_TIMESTAMP, COLUMN_ENERGY and COLUMN_COST.
/// Empty numeric cells deserialize to None.
#[derive(Debug, Deserialize)]
struct RawReading {
    #[serde(rename = "Data/Hora")]
    timestamp: String,
    #[serde(rename = "Consumo em kWh")]
    energy_kwh: Option<f64>,
    #[serde(rename = "Custo Total")]
    cost: Option<f64>,
}

/// A single reading, with the derived day, hour and category.
/// Missing energy or cost values are stored as NAN.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub energy_kwh: f64,
    pub cost: f64,
    pub day: NaiveDate,
    pub hour: u32,
    pub category: Category,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, energy_kwh: f64, cost: f64) -> Reading {
        let hour = timestamp.hour();
        Reading {
            timestamp,
            energy_kwh,
            cost,
            day: timestamp.date(),
            hour,
            category: categorize(hour),
        }
    }
}

/// The enriched readings of one upload.
/// Built once, then only read by the aggregations and the range summary.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    readings: Vec<Reading>,
}

impl Dataset {
    pub fn new(readings: Vec<Reading>) -> Dataset {
        Dataset { readings }
    }

    /// Type and enrich a validated raw table.
    /// Any unparsable timestamp or number rejects the whole table.
    pub fn from_table(table: &RawTable) -> Result<Dataset, DashboardError> {
        table.validate_schema()?;
        let mut readings: Vec<Reading> = Vec::with_capacity(table.records.len());
        for (i, record) in table.records.iter().enumerate() {
            // header is line 1
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(i as u64 + 2);
            let raw: RawReading =
                record
                    .deserialize(Some(&table.headers))
                    .map_err(|e| DashboardError::Parse {
                        line,
                        column: failed_column(&e, &table.headers),
                        value: failed_value(&e, record),
                        reason: e.to_string(),
                    })?;
            let timestamp =
                parse_timestamp(&raw.timestamp).map_err(|e| DashboardError::Parse {
                    line,
                    column: COLUMN_TIMESTAMP.to_string(),
                    value: raw.timestamp.clone(),
                    reason: e.to_string(),
                })?;
            let energy_kwh = raw.energy_kwh.unwrap_or(f64::NAN);
            let cost = raw.cost.unwrap_or(f64::NAN);
            if energy_kwh < 0. || cost < 0. {
                tracing::warn!(
                    line,
                    energy_kwh,
                    cost,
                    "negative value found, it is kept as is"
                );
            }
            readings.push(Reading::new(timestamp, energy_kwh, cost));
        }
        tracing::info!(readings = readings.len(), "dataset enriched");
        Ok(Dataset { readings })
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// First and last observed day, None for an empty dataset.
    pub fn day_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        min_and_max(self.readings.iter().map(|r| &r.day))
    }

    /// Sum of the energy per day.
    pub fn daily_total(&self) -> Aggregate<NaiveDate> {
        group_sum(self.readings.iter().map(|r| (r.day, r.energy_kwh)))
    }

    /// Mean energy per hour of the day.
    /// Hours without any valid reading are absent, there is no zero fill.
    pub fn hourly_average(&self) -> Aggregate<u32> {
        let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for r in self.readings.iter().filter(|r| !r.energy_kwh.is_nan()) {
            let entry = groups.entry(r.hour).or_insert((0., 0));
            entry.0 += r.energy_kwh;
            entry.1 += 1;
        }
        groups
            .into_iter()
            .map(|(hour, (sum, count))| (hour, sum / count as f64))
            .collect()
    }

    /// Sum of the energy per time-of-day category.
    pub fn category_total(&self) -> Aggregate<Category> {
        group_sum(self.readings.iter().map(|r| (r.category, r.energy_kwh)))
    }

    /// Total energy and cost of the readings whose day is within [start, end].
    /// start > end is not an error, it simply selects nothing.
    pub fn summarize(&self, start: NaiveDate, end: NaiveDate) -> Summary {
        let mut summary = Summary::default();
        for r in self
            .readings
            .iter()
            .filter(|r| (r.day >= start) & (r.day <= end))
        {
            summary.readings += 1;
            if !r.energy_kwh.is_nan() {
                summary.energy_kwh += r.energy_kwh;
            }
            if !r.cost.is_nan() {
                summary.cost += r.cost;
            }
        }
        tracing::debug!(%start, %end, readings = summary.readings, "range summary");
        summary
    }

    /// Summary over the whole dataset.
    pub fn summarize_all(&self) -> Summary {
        match self.day_range() {
            Some((start, end)) => self.summarize(start, end),
            None => Summary::default(),
        }
    }
}

/// Totals over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub energy_kwh: f64,
    pub cost: f64,
    pub readings: usize,
}

impl Summary {
    pub fn energy_line(&self) -> String {
        format!("total energy in period: {:.2} kWh", self.energy_kwh)
    }

    pub fn cost_line(&self, currency: &str) -> String {
        format!("total cost in period: {} {:.2}", currency, self.cost)
    }
}

/// Group by key and sum the values, skipping NAN.
/// A key whose values are all NAN is kept with 0.
fn group_sum<K, I>(pairs: I) -> Aggregate<K>
where
    K: Ord,
    I: Iterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for (k, v) in pairs {
        let sum = groups.entry(k).or_insert(0.);
        if !v.is_nan() {
            *sum += v;
        }
    }
    groups.into_iter().collect()
}

fn failed_column(e: &csv::Error, headers: &csv::StringRecord) -> String {
    match e.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err
            .field()
            .and_then(|i| headers.get(i as usize))
            .unwrap_or("unknown")
            .to_string(),
        _ => String::from("unknown"),
    }
}

fn failed_value(e: &csv::Error, record: &csv::StringRecord) -> String {
    match e.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err
            .field()
            .and_then(|i| record.get(i as usize))
            .unwrap_or("")
            .to_string(),
        _ => String::new(),
    }
}
