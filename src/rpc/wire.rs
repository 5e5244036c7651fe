//! Wire-level JSON-RPC shapes and lenient decoders
//!
//! Zabbix encodes ids, counts, severities and values as strings. The decoders
//! in here accept both strings and plain JSON numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Host, Problem, Severity};

use super::error::{ZabbixError, ZabbixResult};

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a Value,
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcResponse {
    /// Backend errors win over a (possibly present) result.
    pub fn into_result(self, method: &str) -> ZabbixResult<Value> {
        if let Some(error) = self.error {
            return Err(ZabbixError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }

        self.result
            .ok_or_else(|| ZabbixError::malformed(method, "response carries neither result nor error"))
    }
}

/// Result of a `countOutput` query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count(pub u64);

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let count = match &value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };

        count
            .map(Count)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a count, got {value}")))
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a string or number, got {value}")))
}

pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => scalar_to_string(&other)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a scalar, got {other}"))),
    }
}

pub fn severity_from_value(value: &Value) -> Severity {
    match value {
        Value::Number(n) => n.as_i64().map_or(Severity::default(), Severity::new),
        Value::String(s) => Severity::parse(s),
        _ => Severity::default(),
    }
}

/// Unix seconds from the backend, or RFC 3339 as written by our own `Serialize`.
fn clock_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(secs) => DateTime::from_timestamp(secs, 0),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|clock| clock.with_timezone(&Utc)),
            }
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct RawProblem {
    #[serde(default, alias = "id", deserialize_with = "lenient_opt_string")]
    eventid: Option<String>,
    #[serde(default, alias = "trigger_id", deserialize_with = "lenient_opt_string")]
    objectid: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    severity: Value,
    #[serde(default)]
    clock: Value,
}

impl From<RawProblem> for Problem {
    fn from(raw: RawProblem) -> Self {
        let trigger_id = raw.objectid.unwrap_or_default();
        Problem {
            id: raw
                .eventid
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| trigger_id.clone()),
            trigger_id,
            name: raw.name.or(raw.description).unwrap_or_default(),
            severity: severity_from_value(&raw.severity),
            clock: clock_from_value(&raw.clock),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawInterface {
    #[serde(default)]
    ip: String,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    name: String,
}

/// `hostgroups` from the backend, or the joined `groups` string of a serialized [`Host`]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGroups {
    List(Vec<RawGroup>),
    Joined(String),
}

impl Default for RawGroups {
    fn default() -> Self {
        RawGroups::List(Vec::new())
    }
}

impl RawGroups {
    fn joined(self) -> String {
        match self {
            RawGroups::List(groups) => groups
                .iter()
                .map(|group| group.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            RawGroups::Joined(joined) => joined,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawHost {
    #[serde(alias = "id", deserialize_with = "lenient_string")]
    hostid: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    interfaces: Vec<RawInterface>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default, alias = "groups")]
    hostgroups: RawGroups,
    #[serde(default)]
    problem_count: usize,
    #[serde(default)]
    metrics: Option<crate::MetricSnapshot>,
}

impl From<RawHost> for Host {
    fn from(raw: RawHost) -> Self {
        let name = if raw.name.is_empty() {
            raw.host.clone()
        } else {
            raw.name
        };

        Host {
            id: raw.hostid,
            host: raw.host,
            name,
            ip: raw
                .interfaces
                .into_iter()
                .next()
                .map(|iface| iface.ip)
                .or(raw.ip)
                .filter(|ip| !ip.is_empty()),
            groups: raw.hostgroups.joined(),
            problem_count: raw.problem_count,
            metrics: raw.metrics,
        }
    }
}
