//! Joins active problem-state triggers with open problems

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::rpc::{Transport, call_as};
use crate::{Problem, Trigger, ZabbixResult};

fn active_triggers_params() -> Value {
    json!({
        "output": "extend",
        "selectHosts": ["hostid", "host", "name"],
        "selectItems": ["itemid", "name", "key_", "lastvalue", "lastclock", "value_type"],
        "filter": { "value": 1 },
        "monitored": true,
        "active": true,
        "skipDependent": true,
        "expandDescription": true,
        "expandExpression": true,
        "expandComment": true,
    })
}

fn open_problems_params() -> Value {
    json!({
        "output": "extend",
        "recent": false,
        "suppressed": false,
        "sortfield": ["eventid"],
        "sortorder": "DESC",
    })
}

/// Attach to every trigger the problems whose `objectid` is its id.
///
/// Problems keep their input order; triggers keep theirs and are returned even
/// when nothing matched.
pub fn attach_problems(mut triggers: Vec<Trigger>, problems: Vec<Problem>) -> Vec<Trigger> {
    let mut by_trigger: HashMap<String, Vec<Problem>> = HashMap::new();
    for problem in problems {
        by_trigger
            .entry(problem.trigger_id.clone())
            .or_default()
            .push(problem);
    }

    for trigger in &mut triggers {
        trigger.problems = by_trigger.get(&trigger.id).cloned().unwrap_or_default();
    }

    triggers
}

/// Fetch triggers in problem state and attach their open problems.
#[instrument(skip(rpc))]
pub async fn correlate(rpc: &dyn Transport) -> ZabbixResult<Vec<Trigger>> {
    let triggers: Vec<Trigger> =
        call_as(rpc, "trigger.get", active_triggers_params(), false).await?;

    if triggers.is_empty() {
        debug!("no triggers in problem state");
        return Ok(Vec::new());
    }

    let problems: Vec<Problem> = call_as(rpc, "problem.get", open_problems_params(), false).await?;

    debug!(
        "correlating {} triggers with {} problems",
        triggers.len(),
        problems.len()
    );

    Ok(attach_problems(triggers, problems))
}
