pub mod aggregation;
pub mod client;
pub mod config;
pub mod format;
pub mod problems;
pub mod rpc;
pub mod util;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rpc::wire::{self, RawHost, RawProblem};

pub use client::ZabbixClient;
pub use rpc::error::{ZabbixError, ZabbixResult};

/// Zabbix severity, always within `0..=5`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Severity(u8);

impl Severity {
    pub const MAX: u8 = 5;

    /// Out-of-range values normalize to 0 ("not classified").
    pub fn new(raw: i64) -> Self {
        match u8::try_from(raw) {
            Ok(value) if value <= Self::MAX => Severity(value),
            _ => Severity(0),
        }
    }

    /// Parses the backend's string encoding, falling back to 0.
    pub fn parse(raw: &str) -> Self {
        raw.trim().parse::<i64>().map_or(Severity(0), Severity::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Information",
            2 => "Warning",
            3 => "Average",
            4 => "High",
            5 => "Disaster",
            _ => "Not classified",
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(wire::severity_from_value(&value))
    }
}

/// A monitored item with its last observed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "itemid", deserialize_with = "wire::lenient_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "key_", default)]
    pub key: String,
    #[serde(default, deserialize_with = "wire::lenient_opt_string")]
    pub lastvalue: Option<String>,
}

/// Host reference as embedded in a trigger (`selectHosts`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRef {
    #[serde(deserialize_with = "wire::lenient_string")]
    pub hostid: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub name: String,
}

impl HostRef {
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            &self.host
        }
    }
}

/// An open problem event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProblem")]
pub struct Problem {
    /// Event id, or the owning trigger id when the backend omitted it
    pub id: String,
    /// Owning trigger (`objectid` on the wire)
    pub trigger_id: String,
    pub name: String,
    pub severity: Severity,
    pub clock: Option<DateTime<Utc>>,
}

/// A trigger currently in problem state with its correlated problems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "triggerid", deserialize_with = "wire::lenient_string")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Severity,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

/// Best-effort metric bundle for one host.
///
/// Values are the raw `lastvalue` strings of the matched items. A `None` field
/// means no matching item was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub cpu_utilization: Option<String>,
    pub memory_utilization: Option<String>,
    pub cpu_count: Option<String>,
    pub total_memory_bytes: Option<String>,
    pub uptime_seconds: Option<String>,
}

impl MetricSnapshot {
    pub fn is_empty(&self) -> bool {
        self == &MetricSnapshot::default()
    }
}

/// Host-centric view assembled from the inventory and the problem join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawHost")]
pub struct Host {
    pub id: String,
    /// Technical host name
    pub host: String,
    /// Visible name, falls back to the technical name
    pub name: String,
    /// IP of the first interface
    pub ip: Option<String>,
    /// Group names joined with `", "`, empty when the host has no groups
    pub groups: String,
    pub problem_count: usize,
    pub metrics: Option<MetricSnapshot>,
}

/// Landing summary recomputed on every load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewSnapshot {
    pub host_count: u64,
    pub problem_count: u64,
    /// Triggers with at least one attached problem, in backend order
    pub hosts_with_problems: Vec<Trigger>,
    pub fetched_at: DateTime<Utc>,
}
