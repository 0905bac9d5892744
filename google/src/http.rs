// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with bearer authentication and rate-limit retries.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};

use crate::config::GoogleConfig;
use crate::error::GoogleError;
use crate::types::ErrorResponse;

/// HTTP client for Calendar API operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: &GoogleConfig) -> Result<Self, GoogleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    /// Builds an unauthenticated request.
    pub fn plain_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Builds a request carrying the access token.
    pub fn build_request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(token)
    }

    /// Sends the request built by `build`, retrying transient API errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the last attempt returns an error status.
    pub async fn execute<F>(&self, build: F) -> Result<Response, GoogleError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            let resp = build().send().await?;
            if resp.status().is_success() {
                return Ok(resp);
            }

            let err = Self::api_error(resp).await;
            if !err.is_retryable() || attempt >= self.max_attempts {
                return Err(err);
            }

            tracing::warn!(attempt, %err, "request failed, retrying");
            tokio::time::sleep(self.retry_delay).await;
            attempt += 1;
        }
    }

    /// Reads the error body of a failed response.
    async fn api_error(resp: Response) -> GoogleError {
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => GoogleError::Api {
                status,
                reasons: body.error.errors.into_iter().map(|e| e.reason).collect(),
                message: body.error.message,
            },
            Err(_) => GoogleError::Api {
                status,
                reasons: Vec::new(),
                message: text,
            },
        }
    }
}
