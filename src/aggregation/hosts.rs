//! Host inventory with problem counts and metric enrichment

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::rpc::{SharedTransport, Transport, call_as};
use crate::{Host, Problem, Trigger, ZabbixResult};

use super::metrics::resolve_metrics;
use super::settle::settle_all;

fn enabled_hosts_params() -> Value {
    json!({
        "output": ["hostid", "host", "name", "status"],
        "selectInterfaces": ["ip"],
        "selectHostGroups": ["name"],
        "filter": { "status": 0 },
    })
}

fn problem_refs_params() -> Value {
    json!({
        "output": ["objectid", "severity", "name"],
        "recent": false,
        "suppressed": false,
    })
}

fn trigger_hosts_params(trigger_ids: &[String]) -> Value {
    json!({
        "output": ["triggerid"],
        "triggerids": trigger_ids,
        "selectHosts": ["hostid"],
    })
}

/// Distinct trigger ids referenced by `problems`, in first-seen order.
fn distinct_trigger_ids(problems: &[Problem]) -> Vec<String> {
    let mut seen = HashSet::new();
    problems
        .iter()
        .filter(|problem| seen.insert(problem.trigger_id.as_str()))
        .map(|problem| problem.trigger_id.clone())
        .collect()
}

/// Count problems per host id.
///
/// Each problem adds one to every host of its trigger. Problems whose trigger
/// is unknown are ignored.
pub fn tally_problems(problems: &[Problem], triggers: &[Trigger]) -> HashMap<String, usize> {
    let index: HashMap<&str, &Trigger> = triggers
        .iter()
        .map(|trigger| (trigger.id.as_str(), trigger))
        .collect();

    let mut counts = HashMap::new();
    for problem in problems {
        let Some(trigger) = index.get(problem.trigger_id.as_str()) else {
            continue;
        };

        for host in &trigger.hosts {
            *counts.entry(host.hostid.clone()).or_default() += 1;
        }
    }

    counts
}

async fn problem_counts(rpc: &dyn Transport) -> ZabbixResult<HashMap<String, usize>> {
    let problems: Vec<Problem> = call_as(rpc, "problem.get", problem_refs_params(), false).await?;

    let trigger_ids = distinct_trigger_ids(&problems);
    if trigger_ids.is_empty() {
        debug!("no open problems");
        return Ok(HashMap::new());
    }

    let triggers: Vec<Trigger> =
        call_as(rpc, "trigger.get", trigger_hosts_params(&trigger_ids), false).await?;

    Ok(tally_problems(&problems, &triggers))
}

/// Attach a metric snapshot to every host.
///
/// Each host resolves in its own task; a task that fails leaves its host
/// without metrics and does not affect the others.
async fn enrich_with_metrics(rpc: &SharedTransport, hosts: &mut [Host], concurrency: Option<usize>) {
    let tasks = hosts.iter().map(|host| {
        let rpc = Arc::clone(rpc);
        let host_id = host.id.clone();
        async move { tokio::spawn(async move { resolve_metrics(rpc.as_ref(), &host_id).await }).await }
    });

    let outcomes = settle_all(tasks, concurrency).await;

    for (host, outcome) in hosts.iter_mut().zip(outcomes) {
        match outcome {
            Ok(snapshot) => host.metrics = Some(snapshot),
            Err(e) => warn!("metric enrichment for host {} failed: {e}", host.id),
        }
    }
}

/// Enabled hosts with problem counts and metrics, most problems first.
///
/// Inventory and problem fetches propagate their errors; metric enrichment
/// never does.
#[instrument(skip(rpc))]
pub async fn list_hosts_with_metrics(
    rpc: &SharedTransport,
    concurrency: Option<usize>,
) -> ZabbixResult<Vec<Host>> {
    let mut hosts: Vec<Host> = call_as(rpc.as_ref(), "host.get", enabled_hosts_params(), false).await?;
    let counts = problem_counts(rpc.as_ref()).await?;

    for host in &mut hosts {
        host.problem_count = counts.get(&host.id).copied().unwrap_or(0);
    }

    debug!("enriching {} hosts with metrics", hosts.len());
    enrich_with_metrics(rpc, &mut hosts, concurrency).await;

    // stable: equal counts keep inventory order
    hosts.sort_by(|a, b| b.problem_count.cmp(&a.problem_count));

    Ok(hosts)
}
