//! Thin wrappers around Web Storage.
//!
//! The recovery token lives in localStorage so it survives browser restarts
//! until the cart converts or empties. The session id lives in sessionStorage
//! so a fresh browsing session gets a fresh id. Storage can be denied outright
//! (private browsing, blocked cookies), so every accessor degrades to a no-op
//! with a logged warning instead of failing the caller.

/// Durable slot holding the recovery token issued by the backend.
pub(crate) const RECOVERY_TOKEN_KEY: &str = "cart_recovery_token";

/// Session-scoped slot holding the anonymous session id.
pub(crate) const SESSION_ID_KEY: &str = "session_id";

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.session_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn read_recovery_token() -> Option<String> {
    local_storage()?.get_item(RECOVERY_TOKEN_KEY).ok().flatten()
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn store_recovery_token(token: &str) {
    let Some(storage) = local_storage() else {
        log::warn!("localStorage unavailable, recovery token not persisted");
        return;
    };
    if let Err(e) = storage.set_item(RECOVERY_TOKEN_KEY, token) {
        log::warn!("Failed to persist recovery token: {e:?}");
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn clear_recovery_token() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(RECOVERY_TOKEN_KEY);
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn read_session_id() -> Option<String> {
    session_storage()?.get_item(SESSION_ID_KEY).ok().flatten()
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn store_session_id(session_id: &str) {
    let Some(storage) = session_storage() else {
        log::warn!("sessionStorage unavailable, session id will not survive navigation");
        return;
    };
    if let Err(e) = storage.set_item(SESSION_ID_KEY, session_id) {
        log::warn!("Failed to persist session id: {e:?}");
    }
}
