//! Login, logout and the capability descriptor.

use reqwest::StatusCode;

use super::*;
use crate::model::About;

const ABOUT_KEY: &str = "about";

impl RequestClient {
    /// Logs in and stores the returned token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let body = serde_json::to_value(LoginRequest { username, password })
            .map_err(|_| ApiError::Unexpected)?;
        let resp: LoginResponse = self
            .call(ApiRequest::post("/login").json(body))
            .await?;

        let Some(token) = resp.token.filter(|t| !t.is_empty()) else {
            tracing::warn!("login response carried no token");
            return Err(ApiError::Unexpected);
        };
        self.session.set_token(&token).map_err(|err| {
            tracing::warn!(error = %err, "failed to persist session token");
            ApiError::Unexpected
        })?;
        tracing::info!(user = username, "logged in");
        Ok(())
    }

    /// Revokes the token server-side and clears it locally.
    ///
    /// Without an active session the token is cleared without a network
    /// call. A 401 means the server already dropped the token and counts as
    /// success.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let Some(token) = self.session.token() else {
            return Ok(());
        };
        if !self.session.is_logged_in() {
            self.clear_token();
            return Ok(());
        }

        let resp = self
            .client
            .post(self.url("/logout"))
            .header(reqwest::header::AUTHORIZATION, http_client::auth_header(&token))
            .json(&serde_json::json!({}))
            .send()
            .await;
        let resp = match resp {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "logout request failed");
                return Err(ApiError::Unexpected);
            }
        };

        let status = resp.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            self.clear_token();
            tracing::info!("logged out");
            return Ok(());
        }
        let body = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        Err(normalize_failure(status, &body, false))
    }

    pub async fn about(&self) -> Result<About, ApiError> {
        self.call(ApiRequest::get("/about").superseding(ABOUT_KEY))
            .await
    }

    fn clear_token(&self) {
        if let Err(err) = self.session.clear() {
            tracing::warn!(error = %err, "failed to clear session token");
        }
    }
}
