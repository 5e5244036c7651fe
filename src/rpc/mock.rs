//! Scripted in-process transport for unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::Transport;
use super::error::{ZabbixError, ZabbixResult};

type Handler = Box<dyn Fn(&Value) -> ZabbixResult<Value> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
    pub skip_auth: bool,
}

/// Answers calls by method name and records every call it receives
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Vec<(String, Handler)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes are tried in registration order; the first for `method` wins.
    pub fn on<F>(mut self, method: &str, handler: F) -> Self
    where
        F: Fn(&Value) -> ZabbixResult<Value> + Send + Sync + 'static,
    {
        self.routes.push((method.to_string(), Box::new(handler)));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, method: &str, params: Value, skip_auth: bool) -> ZabbixResult<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
            skip_auth,
        });

        match self.routes.iter().find(|(name, _)| name == method) {
            Some((_, handler)) => handler(&params),
            None => Err(ZabbixError::Rpc {
                code: -32601,
                message: "Method not found.".to_string(),
                data: None,
            }),
        }
    }
}

pub fn http_failure(code: i32) -> ZabbixError {
    ZabbixError::Transport {
        code,
        message: format!("HTTP error: {code}"),
        body: None,
    }
}
