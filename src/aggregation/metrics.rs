//! Best-effort per-host metric resolution
//!
//! There is no stable identifier for "the CPU item" of a host, so each metric
//! is looked up in two tiers:
//!
//! 1. item name search for a canonical label (one match, lowest item id)
//! 2. key substring search with a short fragment (five candidates, first wins)
//!
//! The key fragments are a heuristic: `total` can just as well match a disk or
//! network item. A metric that cannot be found stays `None`.

use serde_json::{Value, json};
use tracing::{debug, instrument, trace};

use crate::rpc::{Transport, call_as};
use crate::{Item, MetricSnapshot, ZabbixResult};

const NAME_SEARCH_LIMIT: usize = 1;
const KEY_SEARCH_LIMIT: usize = 5;

/// Lookup rule for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricProbe {
    /// Canonical item name searched first
    pub name: &'static str,
    /// Key substring used as fallback
    pub key_fragment: &'static str,
}

pub const CPU_UTILIZATION: MetricProbe = MetricProbe {
    name: "CPU utilization",
    key_fragment: "cpu",
};

pub const MEMORY_UTILIZATION: MetricProbe = MetricProbe {
    name: "Memory utilization",
    key_fragment: "mem",
};

pub const CPU_COUNT: MetricProbe = MetricProbe {
    name: "Number of CPUs",
    key_fragment: "num",
};

pub const TOTAL_MEMORY: MetricProbe = MetricProbe {
    name: "Total memory",
    key_fragment: "total",
};

pub const SYSTEM_UPTIME: MetricProbe = MetricProbe {
    name: "System uptime",
    key_fragment: "uptime",
};

#[derive(Debug, Clone, Copy)]
enum ItemSearch<'a> {
    Name(&'a str),
    Key(&'a str),
}

fn item_search_params(host_id: &str, search: ItemSearch<'_>, limit: usize) -> Value {
    let search = match search {
        ItemSearch::Name(name) => json!({ "name": name }),
        ItemSearch::Key(fragment) => json!({ "key_": fragment }),
    };

    json!({
        "hostids": host_id,
        "output": ["itemid", "name", "key_", "lastvalue"],
        "search": search,
        "sortfield": "itemid",
        "limit": limit,
    })
}

async fn search_first(
    rpc: &dyn Transport,
    host_id: &str,
    search: ItemSearch<'_>,
    limit: usize,
) -> ZabbixResult<Option<Item>> {
    let items: Vec<Item> = call_as(
        rpc,
        "item.get",
        item_search_params(host_id, search, limit),
        false,
    )
    .await?;
    Ok(items.into_iter().next())
}

/// Find the item backing one metric. Errors are swallowed per tier.
#[instrument(skip(rpc), fields(metric = probe.name))]
async fn resolve_item(rpc: &dyn Transport, host_id: &str, probe: MetricProbe) -> Option<Item> {
    match search_first(rpc, host_id, ItemSearch::Name(probe.name), NAME_SEARCH_LIMIT).await {
        Ok(Some(item)) => return Some(item),
        Ok(None) => trace!("no item named like '{}'", probe.name),
        Err(e) => debug!("name search failed: {e}"),
    }

    match search_first(rpc, host_id, ItemSearch::Key(probe.key_fragment), KEY_SEARCH_LIMIT).await {
        Ok(found) => {
            if found.is_none() {
                trace!("no item key containing '{}'", probe.key_fragment);
            }
            found
        }
        Err(e) => {
            debug!("key search failed: {e}");
            None
        }
    }
}

async fn resolve_value(rpc: &dyn Transport, host_id: &str, probe: MetricProbe) -> Option<String> {
    resolve_item(rpc, host_id, probe)
        .await
        .and_then(|item| item.lastvalue)
}

/// Resolve CPU, memory, CPU count, total memory and uptime for one host.
///
/// Never fails: an unreachable backend yields an empty snapshot.
#[instrument(skip(rpc))]
pub async fn resolve_metrics(rpc: &dyn Transport, host_id: &str) -> MetricSnapshot {
    let (cpu_utilization, memory_utilization, cpu_count, total_memory_bytes, uptime_seconds) = tokio::join!(
        resolve_value(rpc, host_id, CPU_UTILIZATION),
        resolve_value(rpc, host_id, MEMORY_UTILIZATION),
        resolve_value(rpc, host_id, CPU_COUNT),
        resolve_value(rpc, host_id, TOTAL_MEMORY),
        resolve_value(rpc, host_id, SYSTEM_UPTIME),
    );

    let snapshot = MetricSnapshot {
        cpu_utilization,
        memory_utilization,
        cpu_count,
        total_memory_bytes,
        uptime_seconds,
    };

    if snapshot.is_empty() {
        debug!("no metrics resolved");
    }

    snapshot
}
