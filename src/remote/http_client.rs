use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use super::*;
use crate::gate::{Decision, decide};

/// Who may issue a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// No session required. A token, if present, is still attached.
    Public,
    /// Any active session.
    Authenticated,
    Role(Role),
}

#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    access: Access,
    op_key: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            access: Access::Public,
            op_key: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn requires(self, role: Role) -> Self {
        self.access(Access::Role(role))
    }

    /// Runs the call under a logical operation key: starting another call
    /// under the same key discards this one's result.
    pub fn superseding(mut self, key: impl Into<String>) -> Self {
        self.op_key = Some(key.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
    bearer_auth: bool,
}

impl RequestClient {
    /// Sends `req` and decodes a JSON body.
    pub async fn call<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        let label = format!("{} {}", req.method, req.path);
        let raw = self.execute(req).await?;
        serde_json::from_slice(&raw.body).map_err(|err| {
            tracing::warn!(call = %label, error = %err, "malformed response body");
            ApiError::Unexpected
        })
    }

    /// Sends `req` and ignores any body.
    pub async fn call_unit(&self, req: ApiRequest) -> Result<(), ApiError> {
        self.execute(req).await.map(|_| ())
    }

    async fn execute(&self, req: ApiRequest) -> Result<RawResponse, ApiError> {
        self.preflight(&req)?;

        let mut handle = match req.op_key.as_deref() {
            Some(key) if req.method == Method::GET => Some(self.inflight.begin(key)),
            Some(key) => {
                tracing::warn!(key, method = %req.method, "mutations cannot be superseded; ignoring operation key");
                None
            }
            None => None,
        };

        let label = format!("{} {}", req.method, req.path);
        let sent = self.send(req);
        let outcome = match handle.as_mut() {
            Some(h) => {
                tokio::select! {
                    out = sent => out,
                    _ = h.cancelled() => {
                        tracing::debug!(call = %label, "dropping superseded request");
                        return Err(ApiError::Cancelled);
                    }
                }
            }
            None => sent.await,
        };

        if let Some(h) = handle.as_ref()
            && !self.inflight.finish(h)
        {
            tracing::debug!(call = %label, "discarding late result of superseded request");
            return Err(ApiError::Cancelled);
        }

        let raw = outcome.map_err(|err| {
            tracing::warn!(call = %label, error = %err, "request failed");
            ApiError::Unexpected
        })?;
        self.ensure_ok(raw, &label)
    }

    fn preflight(&self, req: &ApiRequest) -> Result<(), ApiError> {
        let required = match req.access {
            Access::Public => return Ok(()),
            Access::Authenticated => {
                return if self.session.is_logged_in() {
                    Ok(())
                } else {
                    Err(ApiError::Unauthorized)
                };
            }
            Access::Role(role) => role,
        };
        match decide(&self.session.state(), Some(required), &req.path) {
            Decision::Allow => Ok(()),
            Decision::RedirectToLogin { .. } => Err(ApiError::Unauthorized),
            Decision::RedirectToHome { .. } => Err(ApiError::Forbidden),
        }
    }

    async fn send(&self, req: ApiRequest) -> Result<RawResponse, reqwest::Error> {
        let mut builder = self.client.request(req.method, self.url(&req.path));
        let token = self.session.token();
        let bearer_auth = token.is_some() && req.access != Access::Public;
        if let Some(token) = token {
            builder = builder.header(reqwest::header::AUTHORIZATION, auth_header(&token));
        }
        if let Some(body) = req.body {
            builder = builder.json(&body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        Ok(RawResponse {
            status,
            body,
            bearer_auth,
        })
    }

    fn ensure_ok(&self, raw: RawResponse, label: &str) -> Result<RawResponse, ApiError> {
        if raw.status.is_success() {
            return Ok(raw);
        }
        let err = normalize_failure(raw.status, &raw.body, raw.bearer_auth);
        if err == ApiError::Unauthorized && raw.bearer_auth {
            tracing::info!(call = %label, "session rejected by server; clearing token");
            if let Err(clear_err) = self.session.clear() {
                tracing::warn!(error = %clear_err, "failed to clear rejected token");
            }
        } else {
            tracing::debug!(call = %label, status = %raw.status, "request failed");
        }
        Err(err)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub(super) fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
