use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials and endpoint for [`SheetsClient`](crate::SheetsClient).
///
/// Reads go out with `api_key` alone and fall back to `access_token` on a
/// 403. Writes and sheet creation always need `access_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsClientConfig {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SheetsClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            access_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SheetsClientConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
