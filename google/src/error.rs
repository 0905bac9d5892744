// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use synccal_core::{ProviderError, ProviderErrorKind};

const RATE_LIMIT_REASONS: [&str; 2] = ["rateLimitExceeded", "userRateLimitExceeded"];

/// Google Calendar client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    /// Transport failure: connection, timeout or body read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with an error status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable reasons of the error items.
        reasons: Vec<String>,
        /// Human-readable message.
        message: String,
    },

    /// Credentials are missing, malformed or rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A body that cannot be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GoogleError {
    /// The HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api {
                status, reasons, ..
            } => match *status {
                429 | 500..=599 => true,
                403 => reasons
                    .iter()
                    .any(|r| RATE_LIMIT_REASONS.contains(&r.as_str())),
                _ => false,
            },
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GoogleError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<serde_json::Error> for GoogleError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<GoogleError> for ProviderError {
    fn from(e: GoogleError) -> Self {
        let kind = match &e {
            GoogleError::Http(_) => ProviderErrorKind::Transient,
            GoogleError::Api { status, .. } if matches!(status, 404 | 410) => {
                ProviderErrorKind::NotFound
            }
            GoogleError::Api { .. } if e.is_retryable() => ProviderErrorKind::Transient,
            GoogleError::Api { .. }
            | GoogleError::Auth(_)
            | GoogleError::Json(_)
            | GoogleError::Config(_) => ProviderErrorKind::Permanent,
        };
        ProviderError::new(kind, e.to_string())
    }
}
