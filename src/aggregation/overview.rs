//! Landing overview: counts and problem triggers as of one load

use chrono::Utc;
use serde_json::json;
use tracing::{debug, instrument};

use crate::rpc::wire::Count;
use crate::rpc::{Transport, call_as};
use crate::{OverviewSnapshot, ZabbixResult};

use super::correlator::correlate;

pub async fn host_count(rpc: &dyn Transport) -> ZabbixResult<u64> {
    let Count(count) = call_as::<Count>(rpc, "host.get", json!({ "countOutput": true }), false).await?;
    Ok(count)
}

/// Number of open, unsuppressed problems.
pub async fn problem_count(rpc: &dyn Transport) -> ZabbixResult<u64> {
    let Count(count) = call_as::<Count>(
        rpc,
        "problem.get",
        json!({
            "countOutput": true,
            "recent": false,
            "suppressed": false,
        }),
        false,
    )
    .await?;
    Ok(count)
}

/// Fetch host count, problem count and correlated triggers concurrently.
///
/// All three must succeed; the first failure fails the whole overview.
#[instrument(skip(rpc))]
pub async fn get_overview(rpc: &dyn Transport) -> ZabbixResult<OverviewSnapshot> {
    let (host_count, problem_count, triggers) =
        tokio::try_join!(host_count(rpc), problem_count(rpc), correlate(rpc))?;

    let hosts_with_problems: Vec<_> = triggers
        .into_iter()
        .filter(|trigger| !trigger.problems.is_empty())
        .collect();

    debug!(
        "overview: {host_count} hosts, {problem_count} problems, {} triggers with problems",
        hosts_with_problems.len()
    );

    Ok(OverviewSnapshot {
        host_count,
        problem_count,
        hosts_with_problems,
        fetched_at: Utc::now(),
    })
}
