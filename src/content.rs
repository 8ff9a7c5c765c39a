//! Decoded record bodies.
//!
//! V1 records are JSON with prices keyed by asset name. Every later version,
//! stake records included, uses a protobuf body whose prices are positional
//! integers scaled by 1e8.

use prost::Message;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{GraderError, Result};
use crate::version::ContentEncoding;

/// Scale between on-chain integer prices and floating prices.
pub const PRICE_SCALE: f64 = 1e8;

pub fn uint_to_price(value: u64) -> f64 {
    value as f64 / PRICE_SCALE
}

pub fn price_to_uint(price: f64) -> u64 {
    (price * PRICE_SCALE).round() as u64
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonContent {
    pub coinbase: String,
    #[serde(rename = "dbht")]
    pub height: i32,
    pub winners: Vec<String>,
    #[serde(rename = "minerid")]
    pub identity: String,
    pub assets: BTreeMap<String, f64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoContent {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(string, tag = "2")]
    pub id: String,
    #[prost(int32, tag = "3")]
    pub height: i32,
    #[prost(uint64, repeated, tag = "4")]
    pub assets: Vec<u64>,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub winners: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordContent {
    Json(JsonContent),
    Proto(ProtoContent),
}

impl RecordContent {
    pub fn decode(encoding: ContentEncoding, raw: &[u8]) -> Result<Self> {
        if raw.is_empty() {
            return Err(GraderError::decode("no bytes to decode"));
        }
        match encoding {
            ContentEncoding::Json => serde_json::from_slice::<JsonContent>(raw)
                .map(RecordContent::Json)
                .map_err(|e| GraderError::decode(e.to_string())),
            ContentEncoding::Protobuf => Ok(RecordContent::Proto(ProtoContent::decode(raw)?)),
        }
    }

    pub fn height(&self) -> i32 {
        match self {
            RecordContent::Json(json) => json.height,
            RecordContent::Proto(proto) => proto.height,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            RecordContent::Json(json) => &json.coinbase,
            RecordContent::Proto(proto) => &proto.address,
        }
    }

    pub fn identity(&self) -> &str {
        match self {
            RecordContent::Json(json) => &json.identity,
            RecordContent::Proto(proto) => &proto.id,
        }
    }

    /// Previous winners as short-hash strings. Binary winners are rendered as lowercase hex.
    pub fn previous_winners(&self) -> Vec<String> {
        match self {
            RecordContent::Json(json) => json.winners.clone(),
            RecordContent::Proto(proto) => proto.winners.iter().map(hex::encode).collect(),
        }
    }

    /// Prices laid out in the order of `table`.
    ///
    /// Named prices must include every table entry; names outside the table
    /// are ignored. Positional prices are taken as they are; their count is
    /// checked by the caller.
    pub fn ordered_prices(&self, table: &[&str]) -> Result<Vec<f64>> {
        match self {
            RecordContent::Json(json) => table
                .iter()
                .map(|name| {
                    json.assets.get(*name).copied().ok_or_else(|| {
                        GraderError::validate(format!("asset list is not correct: missing {}", name))
                    })
                })
                .collect(),
            RecordContent::Proto(proto) => Ok(proto.assets.iter().copied().map(uint_to_price).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::V1_ASSETS;

    fn sample_json() -> JsonContent {
        JsonContent {
            coinbase: "FA2jK2HcLnRdS94dEcU27rF3meoJfpUcZPSinpb7AwQvPRY6RL1Q".to_string(),
            height: 7,
            winners: vec![String::new(); 10],
            identity: "miner,one".to_string(),
            assets: V1_ASSETS.iter().map(|a| (a.to_string(), 2.5)).collect(),
        }
    }

    #[test]
    fn test_json_field_names() {
        let raw = br#"{"coinbase":"FA1","dbht":3,"winners":["a"],"minerid":"m","assets":{"USD":1.5}}"#;
        let content = RecordContent::decode(ContentEncoding::Json, raw).unwrap();
        assert_eq!(content.height(), 3);
        assert_eq!(content.address(), "FA1");
        assert_eq!(content.identity(), "m");
        assert_eq!(content.previous_winners(), vec!["a".to_string()]);
    }

    #[test]
    fn test_json_missing_fields_default() {
        let content = RecordContent::decode(ContentEncoding::Json, b"{}").unwrap();
        assert_eq!(content.height(), 0);
        assert!(content.previous_winners().is_empty());
    }

    #[test]
    fn test_malformed_bytes_are_decode_errors() {
        let err = RecordContent::decode(ContentEncoding::Json, b"{not json").unwrap_err();
        assert!(matches!(err, GraderError::Decode(_)));

        let err = RecordContent::decode(ContentEncoding::Protobuf, &[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, GraderError::Decode(_)));

        let err = RecordContent::decode(ContentEncoding::Protobuf, &[]).unwrap_err();
        assert!(matches!(err, GraderError::Decode(_)));
    }

    #[test]
    fn test_ordered_prices_follow_table() {
        let mut json = sample_json();
        json.assets.insert("PNT".to_string(), 0.0);
        json.assets.insert("DCR".to_string(), 31.0);
        let prices = RecordContent::Json(json).ordered_prices(V1_ASSETS).unwrap();
        assert_eq!(prices.len(), 32);
        assert_eq!(prices[0], 0.0);
        assert_eq!(prices[31], 31.0);
        assert_eq!(prices[1], 2.5);
    }

    #[test]
    fn test_ordered_prices_rejects_missing_name() {
        let mut json = sample_json();
        json.assets.remove("XAU");
        json.assets.insert("XYZ".to_string(), 1.0);
        let err = RecordContent::Json(json).ordered_prices(V1_ASSETS).unwrap_err();
        assert!(matches!(err, GraderError::Validate(_)));
    }

    #[test]
    fn test_ordered_prices_ignore_names_outside_table() {
        let mut json = sample_json();
        json.assets.insert("XPX".to_string(), 1.0);
        let prices = RecordContent::Json(json).ordered_prices(V1_ASSETS).unwrap();
        assert_eq!(prices, vec![2.5; 32]);
    }

    #[test]
    fn test_proto_prices_and_winners() {
        let proto = ProtoContent {
            address: "FA1".to_string(),
            id: "id".to_string(),
            height: 12,
            assets: vec![150_000_000, price_to_uint(0.25)],
            winners: vec![vec![0xab; 8], Vec::new()],
        };
        let raw = proto.encode_to_vec();
        let content = RecordContent::decode(ContentEncoding::Protobuf, &raw).unwrap();
        assert_eq!(content.height(), 12);
        assert_eq!(content.previous_winners(), vec!["abababababababab".to_string(), String::new()]);
        assert_eq!(content.ordered_prices(&[]).unwrap(), vec![1.5, 0.25]);
    }
}
