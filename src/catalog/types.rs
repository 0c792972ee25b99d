//! Product payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price: u64,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>, price: u64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }
}

/// A product enriched with its owner from the user service.
///
/// `owner` serializes as `null` when the user service could not be reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub owner: Option<Value>,
}
