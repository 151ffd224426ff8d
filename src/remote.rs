//! HTTP client for the portal API.
//!
//! Every call resolves to `Result<_, ApiError>`; transport and server
//! failures are folded into the [`ApiError`] taxonomy before they leave this
//! module.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::model::normalize_api_url;
use crate::session::{Role, SessionModel};

mod answers;
mod auth_session;
mod error;
mod http_client;
mod questions;
mod supersede;
mod types;

pub use self::error::{ApiError, UNEXPECTED_MESSAGE};
pub(crate) use self::error::normalize_failure;
pub use self::http_client::{Access, ApiRequest};
pub use self::questions::{QUESTIONS_PAGE_KEY, QuestionPatch};
pub use self::supersede::{InflightRegistry, PendingRequestHandle};
pub use self::types::*;

#[derive(Clone)]
pub struct RequestClient {
    base_url: String,
    session: SessionModel,
    client: reqwest::Client,
    inflight: Arc<InflightRegistry>,
}

impl RequestClient {
    pub fn new(base_url: &str, session: SessionModel) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("adreset/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: normalize_api_url(base_url),
            session,
            client,
            inflight: Arc::new(InflightRegistry::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionModel {
        &self.session
    }

    /// Cancels the live call under `key`. Its result, if it arrives, is
    /// discarded. Mutations already sent are not retracted.
    pub fn cancel(&self, key: &str) -> bool {
        self.inflight.cancel(key)
    }
}
