//! Error types for Zabbix API calls

use std::fmt;

use serde_json::Value;

/// Result type alias for Zabbix API operations
pub type ZabbixResult<T> = Result<T, ZabbixError>;

/// Code reported for transport failures where no response was obtained
pub const NO_RESPONSE_CODE: i32 = -1;

/// Errors that can occur while talking to the Zabbix API
#[derive(Debug, Clone)]
pub enum ZabbixError {
    /// No response obtained (`code == -1`) or a non-success HTTP status
    Transport {
        code: i32,
        message: String,
        body: Option<String>,
    },

    /// Error object reported by the backend, kept verbatim
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// The response did not have the shape expected for the method
    MalformedResponse { method: String, reason: String },

    /// Connection profile cannot be used to build a client
    InvalidProfile(String),
}

impl ZabbixError {
    pub(crate) fn no_response(cause: impl fmt::Display) -> Self {
        ZabbixError::Transport {
            code: NO_RESPONSE_CODE,
            message: cause.to_string(),
            body: None,
        }
    }

    pub(crate) fn malformed(method: &str, reason: impl fmt::Display) -> Self {
        ZabbixError::MalformedResponse {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ZabbixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZabbixError::Transport { code, message, .. } if *code == NO_RESPONSE_CODE => {
                write!(f, "request failed without response: {}", message)
            }
            ZabbixError::Transport { message, .. } => write!(f, "transport error: {}", message),
            ZabbixError::Rpc {
                code,
                message,
                data,
            } => match data {
                Some(Value::String(detail)) => {
                    write!(f, "API error {}: {} {}", code, message, detail)
                }
                Some(detail) => write!(f, "API error {}: {} {}", code, message, detail),
                None => write!(f, "API error {}: {}", code, message),
            },
            ZabbixError::MalformedResponse { method, reason } => {
                write!(f, "malformed response to {}: {}", method, reason)
            }
            ZabbixError::InvalidProfile(msg) => write!(f, "invalid connection profile: {}", msg),
        }
    }
}

impl std::error::Error for ZabbixError {}
