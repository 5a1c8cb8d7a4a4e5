//! Recovery-token resolution and cart replay.
//!
//! The recovery page lands on `/cart/recover/{token}`, hands the token to
//! [`resolve_recovery`], and renders whatever comes back: the restored cart
//! (plus an optional discount code for checkout) or a terminal "cart not
//! found or expired" state. Restoring replaces the live cart rather than
//! adding on top of it, so resolving the same token twice cannot duplicate
//! items.

use commerce_utils::{CartItem, CartSnapshot};
use commerce_utils::recovery::RecoverCartData;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub(crate) enum RecoveryError {
    #[error("Cart not found or expired")]
    NotFound,

    #[error("Could not load the saved cart, please try again")]
    Request(#[source] fetch_happen::Error),
}

/// What the recovery page renders after a successful resolve.
#[derive(Debug, Clone, Serialize, Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct RecoveredCart {
    pub items: Vec<CartItem>,
    pub total: f64,
    pub item_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
}

impl RecoveredCart {
    pub(crate) fn from_data(data: RecoverCartData) -> Self {
        let RecoverCartData {
            cart_data,
            discount_code,
        } = data;
        Self {
            items: cart_data.items.iter().cloned().collect(),
            total: cart_data.total,
            item_count: cart_data.item_count(),
            discount_code,
        }
    }
}

/// The live cart store, as far as replay is concerned. The browser build
/// implements this over the store's JS callbacks.
pub(crate) trait CartSink {
    fn clear(&mut self);
    fn add_item(&mut self, item: &CartItem);
}

/// Replace-then-replay: wipe the live cart, then add each recovered line as a
/// discrete operation so the store runs its usual per-item bookkeeping.
pub(crate) fn replay_cart(sink: &mut impl CartSink, snapshot: &CartSnapshot) {
    sink.clear();
    for item in snapshot.items.iter() {
        sink.add_item(item);
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_recovered_cart(token: &str) -> Result<RecoverCartData, RecoveryError> {
    use commerce_utils::recovery::RecoverCartResponse;

    let response = crate::api::get_cart_api(&format!("/abandoned-carts/recover/{token}"))
        .await
        .map_err(RecoveryError::Request)?;

    if !response.ok() {
        log::info!("Recovery token rejected with status {}", response.status());
        return Err(RecoveryError::NotFound);
    }

    let parsed: RecoverCartResponse = response.json().await.map_err(RecoveryError::Request)?;
    if !parsed.is_found() {
        return Err(RecoveryError::NotFound);
    }
    Ok(parsed.into_data())
}

#[cfg(target_arch = "wasm32")]
struct JsCartSink {
    clear_cart: js_sys::Function,
    add_item: js_sys::Function,
}

#[cfg(target_arch = "wasm32")]
impl CartSink for JsCartSink {
    fn clear(&mut self) {
        let this = wasm_bindgen::JsValue::null();
        if let Err(e) = self.clear_cart.call0(&this) {
            log::error!("clear_cart callback threw: {e:?}");
        }
    }

    fn add_item(&mut self, item: &CartItem) {
        let this = wasm_bindgen::JsValue::null();
        match serde_wasm_bindgen::to_value(item) {
            Ok(value) => {
                if let Err(e) = self.add_item.call1(&this, &value) {
                    log::error!("add_item callback threw: {e:?}");
                }
            }
            Err(e) => log::error!("Failed to convert recovered item for the store: {e:?}"),
        }
    }
}

/// Resolve a recovery token from the page URL and replay the saved cart into
/// the live store. The live cart is only touched on success; on failure the
/// rejection message is what the page should render.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub async fn resolve_recovery(
    token: String,
    clear_cart: js_sys::Function,
    add_item: js_sys::Function,
) -> Result<RecoveredCart, wasm_bindgen::JsValue> {
    let data = fetch_recovered_cart(&token)
        .await
        .map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))?;

    let mut sink = JsCartSink {
        clear_cart,
        add_item,
    };
    replay_cart(&mut sink, &data.cart_data);

    // Keep the token around so conversion can reference it; the next tracked
    // cart change starts a fresh flow and supersedes it.
    crate::storage::store_recovery_token(&token);
    log::info!(
        "Restored {} item(s) from recovery token",
        data.cart_data.item_count()
    );

    Ok(RecoveredCart::from_data(data))
}
