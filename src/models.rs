// Domain models: probe samples and aggregation output

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One probe observation, append-only. `created_at` (unix millis) is set by
/// the checker worker at tick time and never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub ok: bool,
    pub target_addr: String,
    /// Logical source label (which network path produced this sample);
    /// comes from configuration, not derived from the probe.
    pub network_type: String,
    /// 0-100.
    pub packet_loss: f64,
    /// Round-trip time in milliseconds; `None` when the probe timed out or
    /// the target was unreachable.
    pub latency: Option<f64>,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

/// Truncation granularity unit for an aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl TimeUnit {
    /// Width of one unit in seconds. Month and year are fixed multiples
    /// (30/365 days) since truncation is measured from the epoch, not the
    /// calendar.
    pub fn as_secs(self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
            TimeUnit::Month => 30 * 86_400,
            TimeUnit::Year => 365 * 86_400,
        }
    }
}

/// Bucket resolution chosen per query; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWidth {
    pub unit: TimeUnit,
    /// Positive multiple of `unit`.
    pub size: i64,
}

impl BucketWidth {
    pub fn seconds(size: i64) -> Self {
        Self {
            unit: TimeUnit::Second,
            size,
        }
    }

    /// Total width in seconds, clamped to at least 1.
    pub fn as_secs(&self) -> i64 {
        (self.unit.as_secs() * self.size).max(1)
    }
}

/// One aggregated `(bucket, networkType)` group. `created_at` is the bucket
/// start in epoch seconds; `latency` is `None` when every contributing
/// sample had no latency reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub created_at: i64,
    pub packet_loss: f64,
    pub latency: Option<f64>,
    pub network_type: String,
}

/// Chart-ready aggregation: bucket start (epoch seconds) to the rows of
/// that bucket, ascending. Keyed by integer to keep ordering explicit;
/// JSON serialization stringifies the keys for transport.
pub type QueryResult = BTreeMap<i64, Vec<AggregateRow>>;
