use reqwest::StatusCode;

pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Every failure a portal call can resolve to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No session, an expired one, or the server rejected the token.
    #[error("You must be logged-in to perform this action")]
    Unauthorized,
    /// The session's role may not perform the action.
    #[error("You do not have permission to perform this action")]
    Forbidden,
    /// The server explained the failure; shown verbatim.
    #[error("{0}")]
    ServerMessage(String),
    #[error("An unexpected error occurred")]
    Unexpected,
    /// A newer call under the same operation key replaced this one. Its
    /// result was discarded.
    #[error("The request was superseded by a newer one")]
    Cancelled,
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// Extracts the human-readable reason from an error body.
pub(crate) fn server_message(body: &[u8]) -> Option<String> {
    let v: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|k| v.get(*k).and_then(|m| m.as_str()))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Maps a non-success response to the error taxonomy.
///
/// `bearer_auth` is whether the call relied on the session token: a 401 then
/// means the session is gone. Unauthenticated endpoints such as `/login` and
/// `/reset` answer 401 with a reason that must reach the user.
pub(crate) fn normalize_failure(status: StatusCode, body: &[u8], bearer_auth: bool) -> ApiError {
    if status == StatusCode::UNAUTHORIZED && bearer_auth {
        return ApiError::Unauthorized;
    }
    if status == StatusCode::FORBIDDEN {
        return ApiError::Forbidden;
    }
    match server_message(body) {
        Some(msg) => ApiError::ServerMessage(msg),
        None if status == StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        None => ApiError::Unexpected,
    }
}

#[cfg(test)]
#[path = "../tests/remote/error_tests.rs"]
mod tests;
