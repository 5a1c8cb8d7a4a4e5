//! Anonymous session identity.
//!
//! Anonymous carts are correlated by a per-browsing-session id rather than any
//! durable device fingerprint: the id is created lazily on the first tracking
//! attempt and dies with the browsing session.

const SESSION_ID_PREFIX: &str = "sess";
const SESSION_ID_ENTROPY_DIGITS: usize = 9;

/// `sess_<epoch-ms>_<random-base36>`. The caller supplies the clock and the
/// entropy so this stays a pure function.
pub(crate) fn format_session_id(now_ms: f64, entropy: f64) -> String {
    format!(
        "{SESSION_ID_PREFIX}_{}_{}",
        now_ms as u64,
        base36_fraction(entropy, SESSION_ID_ENTROPY_DIGITS)
    )
}

/// Expand the fractional part of `entropy` into `digits` base36 characters.
fn base36_fraction(entropy: f64, digits: usize) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut fraction = entropy.fract().abs();
    let mut out = String::with_capacity(digits);
    for _ in 0..digits {
        fraction *= 36.0;
        let digit = (fraction as usize).min(35);
        out.push(ALPHABET[digit] as char);
        fraction -= digit as f64;
    }
    out
}

/// Stable for the lifetime of the browsing session. When sessionStorage is
/// unavailable the id is ephemeral, which only costs cross-page correlation.
#[cfg(target_arch = "wasm32")]
pub(crate) fn get_or_create_session_id() -> String {
    if let Some(existing) = crate::storage::read_session_id() {
        return existing;
    }

    let session_id = format_session_id(js_sys::Date::now(), js_sys::Math::random());
    crate::storage::store_session_id(&session_id);
    session_id
}
