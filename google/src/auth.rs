// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! OAuth tokens stored in an account's credentials.

use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::error::GoogleError;
use crate::http::HttpClient;

/// Tokens expiring within this margin are refreshed ahead of time.
const EXPIRY_MARGIN: SignedDuration = SignedDuration::from_secs(60);

/// An OAuth token as stored in the account credentials.
#[derive(Clone, Deserialize)]
pub struct Token {
    /// Bearer token sent with every request.
    #[serde(default)]
    pub access_token: String,

    /// Long-lived token exchanged for new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Expiry of the access token. Missing or pre-epoch values never expire.
    #[serde(default)]
    pub expiry: Option<Timestamp>,
}

impl Token {
    /// Parses the credentials of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are not a token JSON object.
    pub fn parse(auth: &str) -> Result<Self, GoogleError> {
        let token: Token = serde_json::from_str(auth)
            .map_err(|e| GoogleError::Auth(format!("invalid token: {e}")))?;
        if token.access_token.is_empty() && token.refresh_token.is_none() {
            return Err(GoogleError::Auth("token has no access token".to_string()));
        }
        Ok(token)
    }

    /// Returns whether the access token must be refreshed before use at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        match self.expiry {
            Some(expiry) if expiry > Timestamp::UNIX_EPOCH => {
                expiry.duration_since(now) < EXPIRY_MARGIN
            }
            _ => false,
        }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no refresh token or the endpoint rejects it.
    #[tracing::instrument(skip_all)]
    pub(crate) async fn refresh(
        &self,
        http: &HttpClient,
        config: &GoogleConfig,
        (client_id, client_secret): (&str, &str),
    ) -> Result<Token, GoogleError> {
        let refresh_token = self
            .refresh_token
            .as_deref()
            .ok_or_else(|| GoogleError::Auth("token expired and cannot be refreshed".to_string()))?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        let resp = http
            .execute(|| http.plain_request(reqwest::Method::POST, &config.token_url).form(&form))
            .await
            .map_err(|e| GoogleError::Auth(format!("token refresh failed: {e}")))?;
        let refreshed: RefreshResponse = resp.json().await?;

        tracing::debug!(expires_in = ?refreshed.expires_in, "access token refreshed");
        Ok(Token {
            access_token: refreshed.access_token,
            refresh_token: refreshed
                .refresh_token
                .or_else(|| self.refresh_token.clone()),
            expiry: refreshed
                .expires_in
                .and_then(|secs| Timestamp::now().checked_add(SignedDuration::from_secs(secs)).ok()),
        })
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}
