#[cfg(target_arch = "wasm32")]
fn api_url(path: &str) -> String {
    if cfg!(feature = "local-backend") {
        format!("http://localhost:8080{path}")
    } else {
        format!("https://api.multikonnect.com{path}")
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn post_cart_api(
    path: &str,
    request: impl serde::Serialize,
    access_token: Option<&String>,
    session_id: Option<&String>,
) -> Result<fetch_happen::Response, fetch_happen::Error> {
    let client = fetch_happen::Client;
    let mut builder = client.post(api_url(path)).json(&request)?;
    // Anonymous visitors track by session id alone; signed-in visitors also
    // get the bearer token so the cart is attributable to their account.
    if let Some(access_token) = access_token {
        builder = builder.header("Authorization", format!("Bearer {access_token}"));
    }
    if let Some(session_id) = session_id {
        builder = builder.header("X-Session-ID", session_id);
    }
    builder.send().await
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn get_cart_api(
    path: &str,
) -> Result<fetch_happen::Response, fetch_happen::Error> {
    let client = fetch_happen::Client;
    client.get(api_url(path)).send().await
}
