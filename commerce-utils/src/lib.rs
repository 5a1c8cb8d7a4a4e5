//! Shared cart data model and the abandoned-cart wire contract, used by
//! the MultiKonnect web frontend (`konnect-frontend-rs`).

pub mod recovery;

use serde::{Deserialize, Serialize};

/// A single line item as emitted by the cart store. Field names follow the
/// store's own shape (camelCase), so snapshots can be built straight from
/// store emissions and replayed back without a mapping layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(deserialize_with = "string_or_number", alias = "product_id")]
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "battery_life")]
    pub battery_life: Option<String>,
}

impl CartItem {
    pub fn line_subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// An immutable picture of the cart at one observed mutation. Every change
/// produces a fresh snapshot; nothing mutates an existing one. Items live in
/// an `im::Vector` so clones held for comparison are structurally shared.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CartSnapshot {
    pub items: im::Vector<CartItem>,
    pub total: f64,
    item_count: usize,
}

impl CartSnapshot {
    /// Build a snapshot from a store emission. The store usually provides the
    /// running total; when it doesn't, derive it from the line items.
    pub fn new(items: Vec<CartItem>, total: Option<f64>) -> Self {
        let total = total.unwrap_or_else(|| items.iter().map(CartItem::line_subtotal).sum());
        let items: im::Vector<CartItem> = items.into_iter().collect();
        let item_count = items.len();
        Self {
            items,
            total,
            item_count,
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The cart store serializes product ids inconsistently: numeric ids for
/// catalog products, strings for live-selling SKUs. Accept both.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number product id, got {other}"
        ))),
    }
}
