use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::aggregation;
use crate::config::{ClientOptions, ConnectionProfile};
use crate::rpc::{HttpTransport, SharedTransport, call_as};
use crate::{Host, MetricSnapshot, OverviewSnapshot, Trigger, ZabbixError, ZabbixResult};

/// Outcome of a connection test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionCheck {
    pub success: bool,
    pub version: Option<String>,
    pub message: String,
}

/// Client for one Zabbix API endpoint
///
/// Cheap to clone; clones share the transport and its request counter.
#[derive(Clone)]
pub struct ZabbixClient {
    rpc: SharedTransport,
    options: ClientOptions,
}

impl std::fmt::Debug for ZabbixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZabbixClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ZabbixClient {
    pub fn new(profile: &ConnectionProfile) -> ZabbixResult<Self> {
        Self::with_options(profile, ClientOptions::default())
    }

    pub fn with_options(profile: &ConnectionProfile, options: ClientOptions) -> ZabbixResult<Self> {
        if profile.endpoint_url.trim().is_empty() {
            return Err(ZabbixError::InvalidProfile("missing API URL".to_string()));
        }
        if profile.token.trim().is_empty() {
            return Err(ZabbixError::InvalidProfile("missing API token".to_string()));
        }

        let transport = HttpTransport::new(
            profile.endpoint_url.trim(),
            profile.token.trim(),
            options.timeout_secs.map(Duration::from_secs),
        )?;

        debug!("created client for {}", transport.endpoint());

        Ok(Self::from_transport(Arc::new(transport), options))
    }

    /// Build a client on top of any transport implementation.
    pub fn from_transport(rpc: SharedTransport, options: ClientOptions) -> Self {
        Self { rpc, options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// API version; the call is sent without authorization.
    #[instrument(skip(self))]
    pub async fn version(&self) -> ZabbixResult<String> {
        call_as(self.rpc.as_ref(), "apiinfo.version", json!([]), true).await
    }

    /// Probe the endpoint; never fails.
    pub async fn test_connection(&self) -> ConnectionCheck {
        match self.version().await {
            Ok(version) => ConnectionCheck {
                success: true,
                message: format!("connected to Zabbix API {version}"),
                version: Some(version),
            },
            Err(e) => {
                warn!("connection test failed: {e}");
                ConnectionCheck {
                    success: false,
                    version: None,
                    message: e.to_string(),
                }
            }
        }
    }

    pub async fn host_count(&self) -> ZabbixResult<u64> {
        aggregation::host_count(self.rpc.as_ref()).await
    }

    pub async fn problem_count(&self) -> ZabbixResult<u64> {
        aggregation::problem_count(self.rpc.as_ref()).await
    }

    pub async fn correlate(&self) -> ZabbixResult<Vec<Trigger>> {
        aggregation::correlate(self.rpc.as_ref()).await
    }

    pub async fn resolve_metrics(&self, host_id: &str) -> MetricSnapshot {
        aggregation::resolve_metrics(self.rpc.as_ref(), host_id).await
    }

    pub async fn list_hosts_with_metrics(&self) -> ZabbixResult<Vec<Host>> {
        aggregation::list_hosts_with_metrics(&self.rpc, self.options.enrichment_concurrency).await
    }

    pub async fn get_overview(&self) -> ZabbixResult<OverviewSnapshot> {
        aggregation::get_overview(self.rpc.as_ref()).await
    }
}
