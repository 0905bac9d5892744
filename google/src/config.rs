// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Google Calendar API configuration, the `[google]` table of the configuration file.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Base URL of the Calendar REST API.
    pub base_url: String,

    /// OAuth token endpoint used to refresh expired access tokens.
    pub token_url: String,

    /// OAuth client id. Tokens are only refreshed when both client fields are set.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Attempts per request when the API reports a transient failure.
    pub max_attempts: u32,

    /// Pause between attempts, in seconds.
    pub retry_delay_secs: u64,

    /// Events buffered ahead of the reader while paging.
    pub stream_buffer: usize,

    /// User agent string.
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("synccal-google/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            client_id: None,
            client_secret: None,
            timeout_secs: default_timeout(),
            max_attempts: 5,
            retry_delay_secs: 2,
            stream_buffer: 256,
            user_agent: default_user_agent(),
        }
    }
}

impl GoogleConfig {
    /// The OAuth client credentials, if both are configured.
    #[must_use]
    pub fn client_credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }
}
