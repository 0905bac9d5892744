// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! [`Provider`] implementation backed by the Google Calendar API.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use synccal_core::{
    Account, Calendar, Event, EventSink, EventStream, Platform, Provider, ProviderError,
    event_stream,
};
use tokio::sync::Mutex;

use crate::client::{GoogleClient, ListQuery};
use crate::config::GoogleConfig;
use crate::convert::{from_api, to_api};
use crate::error::GoogleError;
use crate::http::HttpClient;

/// Google Calendar provider serving every Google account.
///
/// One client per account is created on first use and kept for the lifetime of the provider.
#[derive(Debug)]
pub struct GoogleProvider {
    config: GoogleConfig,
    http: Arc<HttpClient>,
    clients: Mutex<HashMap<String, GoogleClient>>,
}

impl GoogleProvider {
    /// Creates a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: GoogleConfig) -> Result<Self, GoogleError> {
        let http = Arc::new(HttpClient::new(&config)?);
        Ok(Self {
            config,
            http,
            clients: Mutex::new(HashMap::new()),
        })
    }

    async fn client(&self, account: &Account) -> Result<GoogleClient, ProviderError> {
        let id = account.id();
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&id) {
            return Ok(client.clone());
        }

        tracing::debug!(account = %id, "creating Google client");
        let client =
            GoogleClient::with_http(self.http.clone(), self.config.clone(), &account.auth).await?;
        clients.insert(id, client.clone());
        Ok(client)
    }

    async fn list(&self, calendar: &Calendar, query: ListQuery) -> Result<EventStream, ProviderError> {
        let client = self.client(&calendar.account).await?;
        let (sink, stream) = event_stream(self.config.stream_buffer);
        tokio::spawn(page_events(
            client,
            calendar.provider_id.clone(),
            query,
            sink,
        ));
        Ok(stream)
    }
}

/// Pages through `events.list`, feeding every item into `sink`.
#[tracing::instrument(skip(client, query, sink))]
async fn page_events(
    client: GoogleClient,
    calendar_id: String,
    query: ListQuery,
    sink: EventSink,
) {
    let mut page_token: Option<String> = None;
    loop {
        if sink.is_closed() {
            tracing::debug!("reader went away, stop paging");
            return;
        }

        let page = match client
            .list_events(&calendar_id, &query, page_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(err = %e, "failed to list events");
                sink.fail(list_error(&query, e)).await;
                return;
            }
        };

        for item in page.items {
            if !sink.send(from_api(item)).await {
                tracing::debug!("reader went away, stop paging");
                return;
            }
        }

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => {
                let cursor = match query {
                    ListQuery::Between(..) => None,
                    ListQuery::From(_) | ListQuery::Since(_) => page.next_sync_token,
                };
                sink.finish(cursor).await;
                return;
            }
        }
    }
}

/// A sync token the API no longer accepts is answered with HTTP 410.
fn list_error(query: &ListQuery, e: GoogleError) -> ProviderError {
    match (query, e.status()) {
        (ListQuery::Since(_), Some(410)) => ProviderError::cursor_expired(e.to_string()),
        _ => e.into(),
    }
}

/// Start of `date` in the local time zone.
fn start_of(date: Date) -> Result<Timestamp, ProviderError> {
    date.to_zoned(TimeZone::system())
        .map(|zoned| zoned.timestamp())
        .map_err(|e| ProviderError::permanent(format!("invalid date {date}: {e}")))
}

#[async_trait]
impl Provider for GoogleProvider {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn events_from(
        &self,
        calendar: &Calendar,
        since: Date,
    ) -> Result<EventStream, ProviderError> {
        self.list(calendar, ListQuery::From(start_of(since)?)).await
    }

    async fn events_since(
        &self,
        calendar: &Calendar,
        cursor: &str,
    ) -> Result<EventStream, ProviderError> {
        self.list(calendar, ListQuery::Since(cursor.to_string()))
            .await
    }

    async fn events_between(
        &self,
        calendar: &Calendar,
        from: Date,
        until: Date,
    ) -> Result<EventStream, ProviderError> {
        let query = ListQuery::Between(start_of(from)?, start_of(until)?);
        self.list(calendar, query).await
    }

    async fn create_event(
        &self,
        calendar: &Calendar,
        prefix: &str,
        event: &Event,
    ) -> Result<Event, ProviderError> {
        let client = self.client(&calendar.account).await?;
        let created = client
            .insert_event(&calendar.provider_id, &to_api(prefix, event))
            .await?;
        Ok(from_api(created))
    }

    async fn update_event(
        &self,
        calendar: &Calendar,
        prefix: &str,
        event: &Event,
    ) -> Result<Event, ProviderError> {
        let client = self.client(&calendar.account).await?;
        let updated = client
            .update_event(&calendar.provider_id, &event.id, &to_api(prefix, event))
            .await?;
        Ok(from_api(updated))
    }

    async fn delete_event(&self, calendar: &Calendar, event_id: &str) -> Result<(), ProviderError> {
        let client = self.client(&calendar.account).await?;
        client.delete_event(&calendar.provider_id, event_id).await?;
        Ok(())
    }
}
