// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Core of synccal: the event model, the provider and storage contracts, the SQLite store and
//! the engine mirroring source calendars into a destination calendar.

mod calendar;
mod config;
mod event;
mod filter;
mod localdb;
mod provider;
mod storage;
mod syncer;

pub use crate::calendar::{
    Account, Calendar, CalendarRole, EventMapping, Platform, account_id, calendar_id,
};
pub use crate::config::{APP_NAME, Config, ConfigError, expand_path, get_config_dir};
pub use crate::event::{Event, EventKind, EventTime, ResponseStatus};
pub use crate::filter::EventFilter;
pub use crate::localdb::{CalendarLink, DB_FILENAME, LocalDb};
pub use crate::provider::{
    EventSink, EventStream, Provider, ProviderError, ProviderErrorKind, Providers, event_stream,
};
pub use crate::storage::{Storage, StorageError};
pub use crate::syncer::{
    CancelHandle, Cancellation, Counts, DestinationReport, SourceReport, SyncError, SyncMode,
    SyncOptions, SyncReport, SyncRequest, Syncer, cancellation,
};
