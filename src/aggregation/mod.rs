//! Aggregation engine turning raw API collections into host-centric views
//!
//! ## Components
//!
//! - **metrics**: best-effort per-host metric resolution (name search, then key search)
//! - **correlator**: joins active triggers with open problems
//! - **hosts**: host inventory with problem counts and concurrent metric enrichment
//! - **overview**: host count, problem count and correlation fetched concurrently
//!
//! ## Call Flow
//!
//! ```text
//! get_overview ──┬── host.get (count)
//!                ├── problem.get (count)
//!                └── correlate ── trigger.get → problem.get
//!
//! list_hosts_with_metrics ── host.get → problem.get → trigger.get
//!                                └── settle_all(resolve_metrics per host) ── item.get × n
//! ```
//!
//! Overview fetches are all-or-nothing. Host enrichment never fails the batch.

pub mod correlator;
pub mod hosts;
pub mod metrics;
pub mod overview;
pub mod settle;

pub use correlator::{attach_problems, correlate};
pub use hosts::{list_hosts_with_metrics, tally_problems};
pub use metrics::resolve_metrics;
pub use overview::{get_overview, host_count, problem_count};
pub use settle::settle_all;
