use crate::routing_info::RoutingInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The single envelope every handler returns and every frame on the wire
/// carries. `status` is always present; the rest are optional so a plain
/// success serializes to `{"status":"success"}` with no clutter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_info: Option<RoutingInfo>,
}

impl Response {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            message: None,
            value: None,
            routing_info: None,
        }
    }

    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success()
        }
    }

    pub fn success_value(value: serde_json::Value) -> Self {
        Self {
            value: Some(value),
            ..Self::success()
        }
    }

    pub fn success_routing_info(routing_info: RoutingInfo) -> Self {
        Self {
            routing_info: Some(routing_info),
            ..Self::success()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            value: None,
            routing_info: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
