use crate::routing_info::RoutingInfo;
use serde::{Deserialize, Serialize};

/// The four request kinds a node accepts, tagged by a `type` field on the
/// wire. Every field access here is checked at deserialization time rather
/// than at each call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "JOIN")]
    Join { node_id: u64, ip: String, port: u16 },
    #[serde(rename = "STORE")]
    Store {
        key: String,
        value: serde_json::Value,
    },
    #[serde(rename = "LOOKUP")]
    Lookup { key: String },
    #[serde(rename = "ROUTING_INFO")]
    RoutingInfo { routing_info: RoutingInfo },
}

impl Message {
    pub const JOIN: &'static str = "JOIN";
    pub const STORE: &'static str = "STORE";
    pub const LOOKUP: &'static str = "LOOKUP";
    pub const ROUTING_INFO: &'static str = "ROUTING_INFO";

    /// The tag values a dispatcher recognizes, used to tell "unknown type"
    /// apart from "known type, malformed body".
    pub fn known_types() -> &'static [&'static str] {
        &[Self::JOIN, Self::STORE, Self::LOOKUP, Self::ROUTING_INFO]
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Join { .. } => Self::JOIN,
            Message::Store { .. } => Self::STORE,
            Message::Lookup { .. } => Self::LOOKUP,
            Message::RoutingInfo { .. } => Self::ROUTING_INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_round_trips_through_json() {
        let msg = Message::Join {
            node_id: 42,
            ip: "127.0.0.1".into(),
            port: 5000,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"JOIN""#));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.type_name(), Message::JOIN);
    }

    #[test]
    fn store_carries_an_opaque_value() {
        let json = r#"{"type":"STORE","key":"apple","value":"red"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        match msg {
            Message::Store { key, value } => {
                assert_eq!(key, "apple");
                assert_eq!(value, serde_json::json!("red"));
            }
            _ => panic!("expected Store"),
        }
    }
}
