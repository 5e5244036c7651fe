//! Flat current-problem rows for alert lists

use serde::Serialize;

use crate::{Severity, Trigger};

const PLACEHOLDER: &str = "-";

/// One open problem with the context needed to display it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentProblem {
    pub problem_id: String,
    pub name: String,
    pub severity: Severity,
    pub host_id: Option<String>,
    pub host_name: String,
    /// Last value of the trigger's first item
    pub last_value: String,
    pub trigger_id: String,
}

/// One row per attached problem, in trigger order then problem order.
///
/// Host and value come from the trigger's first host and first item.
pub fn flatten_problems(triggers: &[Trigger]) -> Vec<CurrentProblem> {
    triggers
        .iter()
        .flat_map(|trigger| {
            let host = trigger.hosts.first();
            let last_value = trigger
                .items
                .first()
                .and_then(|item| item.lastvalue.clone())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string());

            trigger.problems.iter().map(move |problem| CurrentProblem {
                problem_id: problem.id.clone(),
                name: problem.name.clone(),
                severity: problem.severity,
                host_id: host.map(|h| h.hostid.clone()),
                host_name: host
                    .map(|h| h.display_name())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(PLACEHOLDER)
                    .to_string(),
                last_value: last_value.clone(),
                trigger_id: trigger.id.clone(),
            })
        })
        .collect()
}
