use base64::Engine;
use time::OffsetDateTime;

pub(crate) fn token_with_payload(payload: &serde_json::Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = engine.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}

pub(crate) fn token_for(username: &str, roles: &[&str], exp: i64) -> String {
    token_with_payload(&serde_json::json!({
        "sub": { "guid": "guid-1", "username": username },
        "exp": exp,
        "user_claims": { "roles": roles },
    }))
}

pub(crate) fn token_expiring_in(username: &str, role: &str, secs: i64) -> String {
    token_for(
        username,
        &[role],
        OffsetDateTime::now_utc().unix_timestamp() + secs,
    )
}

/// A client pointed at an address nothing listens on, for tests that must
/// not reach the network.
pub(crate) fn offline_client(token: Option<&str>) -> crate::remote::RequestClient {
    let store = match token {
        Some(t) => crate::store::MemoryTokenStore::with_token(t),
        None => crate::store::MemoryTokenStore::new(),
    };
    let session = crate::session::SessionModel::new(std::sync::Arc::new(store));
    crate::remote::RequestClient::new("http://127.0.0.1:9", session).expect("client")
}
