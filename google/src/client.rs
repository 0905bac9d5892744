// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Google Calendar client for one account.

use std::sync::Arc;

use jiff::Timestamp;
use reqwest::{Method, Url};

use crate::auth::Token;
use crate::config::GoogleConfig;
use crate::error::GoogleError;
use crate::http::HttpClient;
use crate::types::{ApiEvent, EventList};

/// Events per page requested from `events.list`.
const PAGE_SIZE: &str = "250";

/// Which events an `events.list` call asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    /// Every event from the instant on, ending with a sync token.
    From(Timestamp),

    /// Changes since the sync token was issued, deletions included.
    Since(String),

    /// Live events in `[from, until)`, ordered by start.
    Between(Timestamp, Timestamp),
}

/// Google Calendar client bound to the credentials of one account.
///
/// # Example
///
/// ```ignore
/// use synccal_google::{GoogleClient, GoogleConfig, ListQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GoogleConfig::default();
/// let auth = r#"{"access_token": "ya29...", "refresh_token": "1//..."}"#;
///
/// let client = GoogleClient::connect(config, auth).await?;
/// let page = client
///     .list_events("primary", &ListQuery::Since("sync-token".into()), None)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GoogleClient {
    http: Arc<HttpClient>,
    config: GoogleConfig,
    access_token: String,
}

impl GoogleClient {
    /// Creates a client, refreshing the access token first if it expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are invalid or the refresh fails.
    pub async fn connect(config: GoogleConfig, auth: &str) -> Result<Self, GoogleError> {
        let http = Arc::new(HttpClient::new(&config)?);
        Self::with_http(http, config, auth).await
    }

    /// Creates a client sharing an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are invalid or the refresh fails.
    pub(crate) async fn with_http(
        http: Arc<HttpClient>,
        config: GoogleConfig,
        auth: &str,
    ) -> Result<Self, GoogleError> {
        let mut token = Token::parse(auth)?;
        if token.is_expired(Timestamp::now()) {
            match config.client_credentials() {
                Some(credentials) => {
                    token = token.refresh(&http, &config, credentials).await?;
                }
                None if token.access_token.is_empty() => {
                    return Err(GoogleError::Auth(
                        "no access token and no client credentials to refresh it".to_string(),
                    ));
                }
                None => tracing::warn!("access token expired and no client credentials are configured"),
            }
        }

        Ok(Self {
            http,
            config,
            access_token: token.access_token,
        })
    }

    /// Fetches one page of events.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; HTTP 410 means the sync token expired.
    #[tracing::instrument(skip(self, query))]
    pub async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListQuery,
        page_token: Option<&str>,
    ) -> Result<EventList, GoogleError> {
        let mut url = self.events_url(calendar_id, None)?;
        {
            let mut params = url.query_pairs_mut();
            params
                .append_pair("singleEvents", "true")
                .append_pair("maxResults", PAGE_SIZE);
            match query {
                ListQuery::From(since) => {
                    params.append_pair("timeMin", &since.to_string());
                }
                ListQuery::Since(token) => {
                    params.append_pair("syncToken", token);
                }
                ListQuery::Between(from, until) => {
                    params
                        .append_pair("timeMin", &from.to_string())
                        .append_pair("timeMax", &until.to_string())
                        .append_pair("orderBy", "startTime")
                        .append_pair("showDeleted", "false");
                }
            }
            if let Some(page_token) = page_token {
                params.append_pair("pageToken", page_token);
            }
        }

        let resp = self
            .http
            .execute(|| {
                self.http
                    .build_request(Method::GET, url.as_str(), &self.access_token)
            })
            .await?;
        Ok(resp.json().await?)
    }

    /// Inserts an event and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self, event))]
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &ApiEvent,
    ) -> Result<ApiEvent, GoogleError> {
        let url = self.events_url(calendar_id, None)?;
        let resp = self
            .http
            .execute(|| {
                self.http
                    .build_request(Method::POST, url.as_str(), &self.access_token)
                    .json(event)
            })
            .await?;
        Ok(resp.json().await?)
    }

    /// Replaces an event and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; HTTP 404 or 410 means the event is gone.
    #[tracing::instrument(skip(self, event))]
    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &ApiEvent,
    ) -> Result<ApiEvent, GoogleError> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        let resp = self
            .http
            .execute(|| {
                self.http
                    .build_request(Method::PUT, url.as_str(), &self.access_token)
                    .json(event)
            })
            .await?;
        Ok(resp.json().await?)
    }

    /// Deletes an event. An event that is already gone counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), GoogleError> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        let result = self
            .http
            .execute(|| {
                self.http
                    .build_request(Method::DELETE, url.as_str(), &self.access_token)
            })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.status(), Some(404 | 410)) => {
                tracing::debug!("event already deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Builds `{base}/calendars/{calendar_id}/events[/{event_id}]` with escaped segments.
    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> Result<Url, GoogleError> {
        let mut url = Url::parse(self.config.base_url.trim_end_matches('/'))
            .map_err(|e| GoogleError::Config(format!("invalid base URL: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| GoogleError::Config("base URL cannot have a path".to_string()))?;
            segments.pop_if_empty().extend(["calendars", calendar_id, "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        Ok(url)
    }
}

impl std::fmt::Debug for GoogleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}
