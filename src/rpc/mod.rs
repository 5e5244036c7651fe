//! JSON-RPC transport to the Zabbix API
//!
//! Every network call of the crate goes through [`Transport::call`]. The HTTP
//! implementation posts one envelope per call to a fixed endpoint and maps
//! failures into [`ZabbixError`]:
//!
//! ```text
//! no response        → Transport { code: -1 }
//! non-2xx status     → Transport { code: status, body }
//! {"error": {...}}   → Rpc { code, message, data }
//! unexpected shape   → MalformedResponse
//! {"result": ...}    → Ok(result)
//! ```

pub mod error;
pub mod wire;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{instrument, trace, warn};

use self::error::{ZabbixError, ZabbixResult};
use self::wire::{RpcRequest, RpcResponse};

pub const JSON_RPC_CONTENT_TYPE: &str = "application/json-rpc";

/// Single exit point to the monitoring backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one JSON-RPC call and return its unvalidated `result`.
    ///
    /// `skip_auth` withholds the bearer token (required for `apiinfo.version`).
    async fn call(&self, method: &str, params: Value, skip_auth: bool) -> ZabbixResult<Value>;
}

/// Transport shared by concurrently running operations
pub type SharedTransport = Arc<dyn Transport>;

/// Call `method` and decode its result into `T`.
pub async fn call_as<T>(
    rpc: &dyn Transport,
    method: &str,
    params: Value,
    skip_auth: bool,
) -> ZabbixResult<T>
where
    T: DeserializeOwned,
{
    let result = rpc.call(method, params, skip_auth).await?;
    serde_json::from_value(result).map_err(|e| ZabbixError::malformed(method, e))
}

/// HTTP POST transport with bearer authentication
pub struct HttpTransport {
    /// HTTP client (reused across requests)
    client: reqwest::Client,

    endpoint: String,

    token: String,

    /// Next JSON-RPC request id
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> ZabbixResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ZabbixError::InvalidProfile(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Reserve the id for the next request. Failed calls consume ids as well.
    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, params), fields(endpoint = %self.endpoint))]
    async fn call(&self, method: &str, params: Value, skip_auth: bool) -> ZabbixResult<Value> {
        let id = self.next_request_id();
        let envelope = RpcRequest {
            jsonrpc: "2.0",
            method,
            params: &params,
            id,
        };

        let body = serde_json::to_vec(&envelope)
            .map_err(|e| ZabbixError::no_response(format!("failed to encode request: {e}")))?;

        trace!("sending request {id}");

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, JSON_RPC_CONTENT_TYPE)
            .body(body);

        if !skip_auth {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await.map_err(|e| {
            warn!("request {id} failed: {e}");
            ZabbixError::no_response(e)
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ZabbixError::no_response(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!("request {id} returned HTTP {status}");
            return Err(ZabbixError::Transport {
                code: i32::from(status.as_u16()),
                message: format!("HTTP error: {status}"),
                body: Some(text),
            });
        }

        let response: RpcResponse =
            serde_json::from_str(&text).map_err(|e| ZabbixError::malformed(method, e))?;

        response.into_result(method).inspect_err(|e| warn!("request {id}: {e}"))
    }
}
