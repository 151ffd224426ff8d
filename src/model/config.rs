use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api/v1";

fn default_lead_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    50
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub version: u32,

    pub api_url: String,

    /// Seconds subtracted from a token's expiry before it is considered expired.
    #[serde(default)]
    pub clock_skew_secs: u64,

    /// How long before expiry the auto-logout fires.
    #[serde(default = "default_lead_secs")]
    pub auto_logout_lead_secs: u64,

    /// Page size used when aggregating the whole question catalog.
    #[serde(default = "default_page_size")]
    pub question_page_size: u32,

    /// Cap on concurrently fetched pages. `None` fans out to every page at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight_pages: Option<usize>,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Self {
        Self {
            version: 1,
            api_url: normalize_api_url(api_url),
            clock_skew_secs: 0,
            auto_logout_lead_secs: default_lead_secs(),
            question_page_size: default_page_size(),
            max_in_flight_pages: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Strips trailing slashes so relative paths can be appended as `/questions`.
pub fn normalize_api_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientState {
    pub version: u32,

    /// The single persisted bearer credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
