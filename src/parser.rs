//! Parser module for Ascendex WebSocket messages
//!
//! Builds outbound subscribe requests and decodes inbound update messages
//! into best bid/offer events.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClientError, Result};
use crate::orderbook::{BestOrderBook, Order};

/// Message tag carried by best bid/offer updates
pub const BBO_MESSAGE: &str = "bbo";

/// Payload of the keepalive ping control frame
pub const PING_PAYLOAD: &[u8] = br#"{ "op": "ping" }"#;

/// Outbound channel subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub op: String,
    pub id: String,
    pub ch: String,
}

impl SubscribeRequest {
    /// Encode as the JSON text sent on the socket
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ClientError::Subscribe(e.to_string()))
    }
}

/// Inbound update envelope
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InboundMessage {
    /// Message type
    #[serde(deserialize_with = "null_as_default")]
    pub m: String,

    /// Venue symbol, e.g. `USDT/BTC`
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,

    #[serde(deserialize_with = "null_as_default")]
    pub data: MessageData,
}

/// Body of an inbound update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessageData {
    /// Venue timestamp (milliseconds)
    #[serde(deserialize_with = "null_as_default")]
    pub ts: i64,

    /// Flattened `[amount, price, amount, price, ...]`
    #[serde(deserialize_with = "null_as_default")]
    pub bid: Vec<String>,

    /// Flattened `[amount, price, amount, price, ...]`
    #[serde(deserialize_with = "null_as_default")]
    pub ask: Vec<String>,
}

impl InboundMessage {
    pub fn is_bbo(&self) -> bool {
        self.m == BBO_MESSAGE
    }

    /// Convert to the top of book.
    ///
    /// Fewer than two entries on either side yields the zeroed book instead of
    /// an error.
    pub fn to_best_order_book(&self) -> BestOrderBook {
        let (ask, bid) = (&self.data.ask, &self.data.bid);
        if ask.len() < 2 || bid.len() < 2 {
            return BestOrderBook::default();
        }

        BestOrderBook {
            ask: Order::new(parse_amount_or_price(&ask[0]), parse_amount_or_price(&ask[1])),
            bid: Order::new(parse_amount_or_price(&bid[0]), parse_amount_or_price(&bid[1])),
        }
    }
}

/// Translate a caller symbol (`USDT_BTC`) into the venue format (`USDT/BTC`)
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.replace('_', "/")
}

/// Build a best bid/offer subscription for `symbol`
pub fn build_subscribe(symbol: &str) -> SubscribeRequest {
    SubscribeRequest {
        op: "sub".to_string(),
        id: chrono::Utc::now().timestamp_millis().to_string(),
        ch: format!("{}:{}", BBO_MESSAGE, normalize_symbol(symbol)),
    }
}

/// Decode a raw frame into the inbound envelope
pub fn classify(raw: &[u8]) -> Result<InboundMessage> {
    Ok(serde_json::from_slice(raw)?)
}

/// Explicit `null` decodes like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a string encoded number; malformed text becomes `0.0`
pub fn parse_amount_or_price(value: &str) -> f64 {
    value.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(m: &str, ask: &[&str], bid: &[&str]) -> InboundMessage {
        InboundMessage {
            m: m.to_string(),
            symbol: "USDT/BTC".to_string(),
            data: MessageData {
                ts: 1672531200000,
                ask: ask.iter().map(|s| s.to_string()).collect(),
                bid: bid.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    #[test]
    fn test_build_subscribe() {
        let sub = build_subscribe("USDT_BTC");
        assert_eq!(sub.op, "sub");
        assert_eq!(sub.ch, "bbo:USDT/BTC");
        assert!(sub.id.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_subscribe_wire_format() {
        let sub = SubscribeRequest {
            op: "sub".to_string(),
            id: "1672531200000".to_string(),
            ch: "bbo:BTC/USDT".to_string(),
        };
        assert_eq!(
            sub.to_json().unwrap(),
            r#"{"op":"sub","id":"1672531200000","ch":"bbo:BTC/USDT"}"#
        );
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("BTC_USDT"), "BTC/USDT");
        assert_eq!(normalize_symbol("BTC/USDT"), "BTC/USDT");
        assert_eq!(normalize_symbol("A_B_C"), "A/B/C");
    }

    #[test]
    fn test_classify_bbo() {
        let raw = br#"{
            "m": "bbo",
            "symbol": "BTC/USDT",
            "data": {
                "ts": 1573068442532,
                "bid": ["0.8", "19999.0"],
                "ask": ["1.5", "20000.0"]
            }
        }"#;

        let msg = classify(raw).unwrap();
        assert!(msg.is_bbo());
        assert_eq!(msg.symbol, "BTC/USDT");
        assert_eq!(msg.data.ts, 1573068442532);
        assert_eq!(
            msg.to_best_order_book(),
            BestOrderBook {
                ask: Order::new(1.5, 20000.0),
                bid: Order::new(0.8, 19999.0),
            }
        );
    }

    #[test]
    fn test_classify_non_bbo_without_data() {
        let msg = classify(br#"{"m":"sub","id":"1","ch":"bbo:BTC/USDT","code":0}"#).unwrap();
        assert!(!msg.is_bbo());
        assert!(msg.data.ask.is_empty());
    }

    #[test]
    fn test_classify_null_fields_as_defaults() {
        let msg = classify(br#"{"m":"sub","id":"1","data":null}"#).unwrap();
        assert!(!msg.is_bbo());
        assert_eq!(msg.data, MessageData::default());

        let msg = classify(
            br#"{"m":"bbo","symbol":null,"data":{"ts":null,"bid":null,"ask":["1.5","20000.0"]}}"#,
        )
        .unwrap();
        assert!(msg.is_bbo());
        assert_eq!(msg.symbol, "");
        assert_eq!(msg.data.ts, 0);
        assert!(msg.data.bid.is_empty());
        assert!(msg.to_best_order_book().is_empty());

        assert!(!classify(br#"{"m":null}"#).unwrap().is_bbo());
    }

    #[test]
    fn test_classify_malformed() {
        assert!(matches!(classify(b"{not json"), Err(ClientError::Decode(_))));
        assert!(matches!(
            classify(br#"{"m":"bbo","data":{"ask":"oops"}}"#),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn test_is_bbo_exact_match() {
        assert!(message("bbo", &[], &[]).is_bbo());
        assert!(!message("trade", &[], &[]).is_bbo());
        assert!(!message("", &[], &[]).is_bbo());
        assert!(!message("BBO", &[], &[]).is_bbo());
        assert!(!message("bbo ", &[], &[]).is_bbo());
    }

    #[test]
    fn test_to_best_order_book_uses_first_level() {
        let msg = message(
            "bbo",
            &["1.5", "20000.0", "2.0", "20001.0"],
            &["0.8", "19999.0", "1.1", "19998.0"],
        );
        let book = msg.to_best_order_book();
        assert_eq!(book.ask, Order::new(1.5, 20000.0));
        assert_eq!(book.bid, Order::new(0.8, 19999.0));
    }

    #[test]
    fn test_short_levels_yield_zero_book() {
        let bid = ["0.8", "19999.0"];
        assert!(message("bbo", &["1.5"], &bid).to_best_order_book().is_empty());
        assert!(message("bbo", &[], &bid).to_best_order_book().is_empty());
        assert!(message("bbo", &["1.5", "20000.0"], &["0.8"])
            .to_best_order_book()
            .is_empty());
    }

    #[test]
    fn test_parse_amount_or_price() {
        assert_eq!(parse_amount_or_price("20000.5"), 20000.5);
        assert_eq!(parse_amount_or_price("not-a-number"), 0.0);
        assert_eq!(parse_amount_or_price(""), 0.0);
    }

    #[test]
    fn test_malformed_number_degrades_to_zero() {
        let book = message("bbo", &["x", "20000.0"], &["0.8", "?"]).to_best_order_book();
        assert_eq!(book.ask, Order::new(0.0, 20000.0));
        assert_eq!(book.bid, Order::new(0.8, 0.0));
    }

    #[test]
    fn test_ping_payload() {
        assert_eq!(PING_PAYLOAD, br#"{ "op": "ping" }"#);
    }
}
