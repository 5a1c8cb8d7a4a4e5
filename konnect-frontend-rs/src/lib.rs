#![deny(clippy::string_slice)]

//! WASM module of the MultiKonnect web client: abandoned-cart tracking and
//! recovery. The JS cart store subscribes a single [`CartTracker`] to its
//! emissions; the recovery page calls [`recovery::resolve_recovery`] with the
//! token from its URL.

mod api;
pub mod recovery;
mod session;
mod storage;
mod tracker;
mod utils;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

pub use commerce_utils::{CartItem, CartSnapshot};
pub use recovery::RecoveredCart;

use tracker::TrackerState;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use commerce_utils::recovery::{ConvertCartRequest, TrackCartRequest, TrackCartResponse};

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[allow(clippy::declare_interior_mutable_const)]
const LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

/// Who the visitor is, as far as tracking cares. Updated on auth-state
/// changes rather than threaded through every cart emission.
#[derive(Debug, Clone, Default)]
struct ShopperIdentity {
    user_id: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    access_token: Option<String>,
}

/// Observes cart-store emissions and keeps the backend's copy of the cart
/// fresh, best-effort. Owns all tracking state; construct one at app start
/// and call [`CartTracker::dispose`] when tearing the app down.
#[wasm_bindgen]
pub struct CartTracker {
    state: Rc<RefCell<TrackerState>>,
    identity: RefCell<ShopperIdentity>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl CartTracker {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new() -> Self {
        // used to only initialize the logger once
        #[allow(clippy::borrow_interior_mutable_const)]
        *LOGGER;

        Self {
            state: Rc::new(RefCell::new(TrackerState::default())),
            identity: RefCell::new(ShopperIdentity::default()),
        }
    }

    /// Attach the signed-in visitor so tracked carts are attributable to them
    /// (and recovery emails can reach them). Anonymous visitors are tracked
    /// by session id alone.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_identity(
        &self,
        user_id: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        access_token: Option<String>,
    ) {
        log::info!(
            "Cart tracking identity set (user: {})",
            user_id.as_deref().unwrap_or("anonymous")
        );
        *self.identity.borrow_mut() = ShopperIdentity {
            user_id,
            email,
            phone,
            access_token,
        };
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn clear_identity(&self) {
        *self.identity.borrow_mut() = ShopperIdentity::default();
    }

    /// Called on every cart-store emission. Collapses bursts of edits into a
    /// single tracking call after a quiet period; an empty cart tears the
    /// tracking state down instead. Never blocks and never surfaces errors.
    #[cfg(target_arch = "wasm32")]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn track_cart_change(&self, items: Vec<CartItem>, total: Option<f64>) {
        let snapshot = CartSnapshot::new(items, total);
        // bind the action first so the borrow is released before cleanup re-borrows
        let action = self.state.borrow_mut().note_change(snapshot);
        let generation = match action {
            tracker::ChangeAction::Cleanup => {
                self.clear_cart_tracking();
                return;
            }
            tracker::ChangeAction::Debounce(generation) => generation,
        };

        let state = Rc::clone(&self.state);
        let identity = self.identity.borrow().clone();
        wasm_bindgen_futures::spawn_local(async move {
            utils::sleep_ms(tracker::DEBOUNCE_QUIET_MS).await;

            // A newer edit, cleanup, or dispose() may have superseded us while
            // we slept; an unchanged cart needs no call at all.
            let Some(snapshot) = state.borrow_mut().take_due_snapshot(generation) else {
                return;
            };

            let session_id = session::get_or_create_session_id();
            let request = TrackCartRequest {
                cart_data: snapshot.clone(),
                email: identity.email.clone(),
                phone: identity.phone.clone(),
            };

            let response = api::post_cart_api(
                "/abandoned-carts",
                &request,
                identity.access_token.as_ref(),
                Some(&session_id),
            )
            .await;

            // Tracking is best-effort: every failure is logged and swallowed,
            // and the next cart edit retries organically.
            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    log::warn!("Cart tracking sync failed: {e:?}");
                    return;
                }
            };
            if !response.ok() {
                log::warn!("Cart tracking sync rejected: status {}", response.status());
                return;
            }
            let parsed: TrackCartResponse = match response.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::warn!("Cart tracking sync returned an unreadable body: {e:?}");
                    return;
                }
            };

            if !state.borrow_mut().record_synced(generation, snapshot) {
                // A newer change started its own sync while ours was in
                // flight; its token is the one that matters.
                log::info!("Dropping recovery token from a superseded sync");
                return;
            }
            if let Some(token) = parsed.into_recovery_token() {
                storage::store_recovery_token(&token);
            }
        });
    }

    /// Tell the backend the tracked cart became an order, then drop all local
    /// tracking state so no stale recovery reminder fires. Returns false (and
    /// leaves state untouched) when there is nothing to convert or the call
    /// fails; conversion is an optimization, not a consistency requirement.
    #[cfg(target_arch = "wasm32")]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn mark_converted(&self, order_id: Option<String>) -> bool {
        let Some(token) = storage::read_recovery_token() else {
            return false;
        };

        let access_token = self.identity.borrow().access_token.clone();
        let request = ConvertCartRequest { order_id };
        let response = api::post_cart_api(
            &format!("/abandoned-carts/{token}/converted"),
            &request,
            access_token.as_ref(),
            None,
        )
        .await;

        match response {
            Ok(response) if response.ok() => {
                self.clear_cart_tracking();
                log::info!("Abandoned-cart tracking converted to an order");
                true
            }
            Ok(response) => {
                log::warn!("Cart conversion rejected: status {}", response.status());
                false
            }
            Err(e) => {
                log::warn!("Cart conversion failed: {e:?}");
                false
            }
        }
    }

    /// Cancel pending work, clear the idempotence guard, and remove the
    /// durable recovery token. Used when the cart empties and after a
    /// successful conversion.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn clear_cart_tracking(&self) {
        self.state.borrow_mut().reset();
        #[cfg(target_arch = "wasm32")]
        storage::clear_recovery_token();
    }

    /// Cancel any pending debounced sync. A disposed tracker left to be
    /// garbage-collected can no longer fire.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn dispose(&self) {
        self.state.borrow_mut().cancel_pending();
    }
}

impl Default for CartTracker {
    fn default() -> Self {
        Self::new()
    }
}
