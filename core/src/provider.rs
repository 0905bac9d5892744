// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The contract every calendar provider fulfils, and the stream type it hands events back with.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use async_trait::async_trait;
use jiff::civil::Date;
use tokio::sync::mpsc;

use crate::calendar::{Calendar, Platform};
use crate::event::Event;

/// Access to the events of one calendar platform.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The platform served by this provider.
    fn platform(&self) -> Platform;

    /// Lists every event starting on or after `since`. The stream ends with a fresh cursor.
    async fn events_from(
        &self,
        calendar: &Calendar,
        since: Date,
    ) -> Result<EventStream, ProviderError>;

    /// Lists the events changed since `cursor` was issued, cancelled ones included.
    async fn events_since(
        &self,
        calendar: &Calendar,
        cursor: &str,
    ) -> Result<EventStream, ProviderError>;

    /// Lists the live events in `[from, until)`. Does not produce a cursor.
    async fn events_between(
        &self,
        calendar: &Calendar,
        from: Date,
        until: Date,
    ) -> Result<EventStream, ProviderError>;

    /// Creates a copy of `event` with `prefix` prepended to its title. Returns the new event.
    async fn create_event(
        &self,
        calendar: &Calendar,
        prefix: &str,
        event: &Event,
    ) -> Result<Event, ProviderError>;

    /// Overwrites the event whose id is `event.id` with `event`, title prefixed.
    async fn update_event(
        &self,
        calendar: &Calendar,
        prefix: &str,
        event: &Event,
    ) -> Result<Event, ProviderError>;

    /// Deletes an event. Deleting an already removed event succeeds.
    async fn delete_event(&self, calendar: &Calendar, event_id: &str) -> Result<(), ProviderError>;
}

/// A failure reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    /// Classification of the failure.
    pub kind: ProviderErrorKind,

    /// Human readable details.
    pub message: String,
}

impl ProviderError {
    /// Creates an error of the given kind.
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Retryable failure (rate limit, network) that survived the provider's own retries.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transient, message)
    }

    /// Non-retryable failure.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Permanent, message)
    }

    /// The addressed event or calendar does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotFound, message)
    }

    /// The cursor is no longer accepted and a full listing is required.
    pub fn cursor_expired(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::CursorExpired, message)
    }

    /// Returns whether the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind == ProviderErrorKind::NotFound
    }

    /// Returns whether the cursor was rejected.
    pub fn is_cursor_expired(&self) -> bool {
        self.kind == ProviderErrorKind::CursorExpired
    }
}

/// Classification of a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// Retryable, retries exhausted.
    Transient,

    /// Not retryable.
    Permanent,

    /// Resource missing.
    NotFound,

    /// Sync cursor rejected.
    CursorExpired,
}

impl Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderErrorKind::Transient => "transient provider error",
            ProviderErrorKind::Permanent => "provider error",
            ProviderErrorKind::NotFound => "not found",
            ProviderErrorKind::CursorExpired => "sync cursor expired",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
enum Message {
    Event(Event),
    Done(Option<String>),
    Failed(ProviderError),
}

#[derive(Debug)]
enum StreamState {
    Open,
    Finished(Option<String>),
    Failed,
}

/// Creates a bounded event stream and the sink feeding it.
///
/// The producer blocks once `buffer` events are waiting, so a slow reader throttles paging.
pub fn event_stream(buffer: usize) -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let sink = EventSink { tx };
    let stream = EventStream {
        rx,
        state: StreamState::Open,
    };
    (sink, stream)
}

/// Lazy, single-reader sequence of events ending in either a cursor or an error.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<Message>,
    state: StreamState,
}

impl EventStream {
    /// Builds an already complete stream over `events`.
    pub fn from_events(events: Vec<Event>, cursor: Option<String>) -> Self {
        let (sink, stream) = event_stream(events.len() + 1);
        for event in events {
            // capacity covers every message, so try_send cannot fail
            let _ = sink.tx.try_send(Message::Event(event));
        }
        let _ = sink.tx.try_send(Message::Done(cursor));
        stream
    }

    /// Builds a stream that yields `events` and then fails with `err`.
    pub fn failing_after(events: Vec<Event>, err: ProviderError) -> Self {
        let (sink, stream) = event_stream(events.len() + 1);
        for event in events {
            let _ = sink.tx.try_send(Message::Event(event));
        }
        let _ = sink.tx.try_send(Message::Failed(err));
        stream
    }

    /// Returns the next event, `Some(Err(_))` once on failure, then `None`.
    pub async fn next(&mut self) -> Option<Result<Event, ProviderError>> {
        if !matches!(self.state, StreamState::Open) {
            return None;
        }

        match self.rx.recv().await {
            Some(Message::Event(event)) => Some(Ok(event)),
            Some(Message::Done(cursor)) => {
                self.state = StreamState::Finished(cursor);
                self.rx.close();
                None
            }
            Some(Message::Failed(err)) => {
                self.state = StreamState::Failed;
                self.rx.close();
                Some(Err(err))
            }
            None => {
                self.state = StreamState::Failed;
                Some(Err(ProviderError::permanent(
                    "event stream closed before completion",
                )))
            }
        }
    }

    /// Returns whether the stream ran to its end without error.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, StreamState::Finished(_))
    }

    /// The cursor produced by the provider, available once the stream is exhausted.
    pub fn cursor(&self) -> Option<&str> {
        match &self.state {
            StreamState::Finished(cursor) => cursor.as_deref(),
            _ => None,
        }
    }
}

/// Producer half of an [`EventStream`].
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::Sender<Message>,
}

impl EventSink {
    /// Pushes an event, waiting for room. Returns `false` when the reader went away.
    pub async fn send(&self, event: Event) -> bool {
        self.tx.send(Message::Event(event)).await.is_ok()
    }

    /// Ends the stream successfully.
    pub async fn finish(self, cursor: Option<String>) {
        let _ = self.tx.send(Message::Done(cursor)).await;
    }

    /// Ends the stream with an error.
    pub async fn fail(self, err: ProviderError) {
        let _ = self.tx.send(Message::Failed(err)).await;
    }

    /// Returns whether the reader dropped the stream.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Registry of the providers available to the engine, keyed by platform.
#[derive(Clone, Default)]
pub struct Providers {
    inner: HashMap<Platform, Arc<dyn Provider>>,
}

impl Providers {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under its platform, replacing any previous one.
    #[must_use]
    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    /// Registers `provider` under its platform, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.inner.insert(provider.platform(), provider);
    }

    /// Looks up the provider of a platform.
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn Provider>> {
        self.inner.get(&platform).cloned()
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.keys()).finish()
    }
}
