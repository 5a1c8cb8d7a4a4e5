//! Wire contract for the abandoned-cart endpoints.
//!
//! The backend stores tracked carts and hands out opaque recovery tokens;
//! this module owns the request/response shapes and the tolerant parsing of
//! recovered snapshots. Different backend versions have returned `cart_data`
//! as a JSON object, a bare item array, or a JSON string wrapping either, so
//! the deserializer accepts all of them and degrades to an empty snapshot
//! rather than failing the whole recovery page.

use serde::{Deserialize, Serialize};

use crate::{CartItem, CartSnapshot};

/// Body of `POST /abandoned-carts`. The session id travels in the
/// `X-Session-ID` header, not the body.
#[derive(Debug, Clone, Serialize)]
pub struct TrackCartRequest {
    pub cart_data: CartSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackCartResponse {
    #[serde(default)]
    pub data: Option<TrackCartData>,
}

#[derive(Debug, Deserialize)]
pub struct TrackCartData {
    #[serde(default)]
    pub recovery_token: Option<String>,
}

impl TrackCartResponse {
    pub fn into_recovery_token(self) -> Option<String> {
        self.data.and_then(|data| data.recovery_token)
    }
}

/// Body of `GET /abandoned-carts/recover/{token}`.
#[derive(Debug, Deserialize)]
pub struct RecoverCartResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub data: Option<RecoverCartData>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecoverCartData {
    #[serde(default, deserialize_with = "deserialize_cart_data")]
    pub cart_data: CartSnapshot,
    #[serde(default)]
    pub discount_code: Option<String>,
}

impl RecoverCartResponse {
    /// The backend signals a missing or expired token either via the HTTP
    /// status or via an in-body status field.
    pub fn is_found(&self) -> bool {
        self.status.is_none_or(|status| status == 200) && self.data.is_some()
    }

    pub fn into_data(self) -> RecoverCartData {
        self.data.unwrap_or_default()
    }
}

/// Body of `POST /abandoned-carts/{token}/converted`.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertCartRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

fn deserialize_cart_data<'de, D>(deserializer: D) -> Result<CartSnapshot, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(cart_snapshot_from_value(value))
}

/// Coerce whatever shape the backend returned for `cart_data` into a
/// snapshot. Unknown shapes and unparseable line items degrade to "fewer
/// items", never to an error.
pub fn cart_snapshot_from_value(value: serde_json::Value) -> CartSnapshot {
    match value {
        // Some backends persist the snapshot as TEXT and return it re-encoded
        serde_json::Value::String(s) => match serde_json::from_str(&s) {
            Ok(inner) => cart_snapshot_from_value(inner),
            Err(_) => CartSnapshot::default(),
        },
        serde_json::Value::Array(raw_items) => CartSnapshot::new(parse_items(raw_items), None),
        serde_json::Value::Object(mut map) => {
            let raw_items = match map.remove("items") {
                Some(serde_json::Value::Array(raw_items)) => raw_items,
                _ => Vec::new(),
            };
            let total = map.get("total").and_then(serde_json::Value::as_f64);
            CartSnapshot::new(parse_items(raw_items), total)
        }
        _ => CartSnapshot::default(),
    }
}

fn parse_items(raw_items: Vec<serde_json::Value>) -> Vec<CartItem> {
    raw_items
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<CartItem>(raw).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_request_shape() {
        let snapshot = CartSnapshot::new(
            vec![CartItem {
                product_id: "A".to_string(),
                name: "Blender".to_string(),
                price: 10.0,
                quantity: 2,
                color: None,
                size: None,
                storage: None,
                ram: None,
                battery_life: None,
            }],
            None,
        );
        let request = TrackCartRequest {
            cart_data: snapshot,
            email: Some("shopper@example.com".to_string()),
            phone: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["cart_data"]["total"], 20.0);
        assert_eq!(json["cart_data"]["item_count"], 1);
        assert_eq!(json["cart_data"]["items"][0]["productId"], "A");
        assert_eq!(json["email"], "shopper@example.com");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_track_response_token() {
        let response: TrackCartResponse =
            serde_json::from_str(r#"{"data": {"recovery_token": "tok_123"}}"#).unwrap();
        assert_eq!(response.into_recovery_token().as_deref(), Some("tok_123"));

        let response: TrackCartResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert_eq!(response.into_recovery_token(), None);

        let response: TrackCartResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.into_recovery_token(), None);
    }

    #[test]
    fn test_recover_cart_object_shape() {
        let response: RecoverCartResponse = serde_json::from_str(
            r#"{"status": 200, "data": {
                "cart_data": {"items": [
                    {"productId": "A", "name": "Blender", "price": 10.0, "quantity": 2},
                    {"productId": "B", "name": "Kettle", "price": 5.0, "quantity": 1}
                ], "total": 25.0},
                "discount_code": "SAVE10"
            }}"#,
        )
        .unwrap();
        assert!(response.is_found());
        let data = response.into_data();
        assert_eq!(data.cart_data.item_count(), 2);
        assert_eq!(data.cart_data.total, 25.0);
        assert_eq!(data.discount_code.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_recover_cart_bare_array_shape() {
        let response: RecoverCartResponse = serde_json::from_str(
            r#"{"data": {"cart_data": [
                {"productId": "A", "name": "Blender", "price": 10.0, "quantity": 2}
            ]}}"#,
        )
        .unwrap();
        let data = response.into_data();
        assert_eq!(data.cart_data.item_count(), 1);
        // Total falls back to the line-item sum
        assert_eq!(data.cart_data.total, 20.0);
        assert_eq!(data.discount_code, None);
    }

    #[test]
    fn test_recover_cart_string_wrapped_shape() {
        let response: RecoverCartResponse = serde_json::from_str(
            r#"{"data": {"cart_data":
                "{\"items\": [{\"productId\": \"A\", \"name\": \"Blender\", \"price\": 10.0, \"quantity\": 2}], \"total\": 20.0}"
            }}"#,
        )
        .unwrap();
        assert_eq!(response.into_data().cart_data.item_count(), 1);
    }

    #[test]
    fn test_recover_cart_null_and_garbage_degrade_to_empty() {
        let response: RecoverCartResponse =
            serde_json::from_str(r#"{"data": {"cart_data": null}}"#).unwrap();
        assert!(response.into_data().cart_data.is_empty());

        let response: RecoverCartResponse =
            serde_json::from_str(r#"{"data": {"cart_data": "not json at all"}}"#).unwrap();
        assert!(response.into_data().cart_data.is_empty());

        // One malformed line item drops that item, not the cart
        let response: RecoverCartResponse = serde_json::from_str(
            r#"{"data": {"cart_data": {"items": [
                {"productId": "A", "name": "Blender", "price": 10.0, "quantity": 2},
                {"unrelated": true}
            ]}}}"#,
        )
        .unwrap();
        assert_eq!(response.into_data().cart_data.item_count(), 1);
    }

    #[test]
    fn test_recover_cart_not_found_status() {
        let response: RecoverCartResponse =
            serde_json::from_str(r#"{"status": 404}"#).unwrap();
        assert!(!response.is_found());
    }

    #[test]
    fn test_convert_request_shape() {
        let with_order = ConvertCartRequest {
            order_id: Some("ord_9".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&with_order).unwrap(),
            r#"{"order_id":"ord_9"}"#
        );

        let without_order = ConvertCartRequest { order_id: None };
        assert_eq!(serde_json::to_string(&without_order).unwrap(), "{}");
    }
}
