//! Order - feed event payload
//!
//! One transmission order as announced by the server.

use serde::{Deserialize, Serialize};

/// Transmission order announced on the feed
///
/// Only the fields the receiver acts on are modelled; anything else in the
/// JSON body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order status (e.g. "transmitting", "sent")
    pub status: String,

    /// Transmission sequence number
    pub tx_seq_num: u32,

    /// Message size in bytes
    #[serde(default)]
    pub message_size: u64,
}

impl Order {
    /// Parse an order from a feed event body
    pub fn from_json(data: &str) -> Result<Self, crate::ContractError> {
        serde_json::from_str(data).map_err(|e| crate::ContractError::MalformedEvent {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_ignores_extra_fields() {
        let data = r#"{
            "uuid": "6ec5ae1f-0bd6-4c4a-9e8b-bb2b3f4a39a3",
            "status": "transmitting",
            "tx_seq_num": 42,
            "message_size": 1024,
            "bid": 5000
        }"#;
        let order = Order::from_json(data).unwrap();
        assert_eq!(order.status, "transmitting");
        assert_eq!(order.tx_seq_num, 42);
        assert_eq!(order.message_size, 1024);
    }

    #[test]
    fn test_parse_order_rejects_missing_seq_num() {
        let result = Order::from_json(r#"{"status": "transmitting"}"#);
        assert!(matches!(
            result,
            Err(crate::ContractError::MalformedEvent { .. })
        ));
    }
}
