// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The reconciliation engine mirroring source calendars into their destinations.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use jiff::civil::Date;
use jiff::{Span, Zoned};
use tokio::sync::watch;

use crate::calendar::{Calendar, Platform};
use crate::event::Event;
use crate::filter::EventFilter;
use crate::provider::{EventStream, Provider, ProviderError, Providers};
use crate::storage::{Storage, StorageError};

/// Upper bound for day counts taken from configuration.
const MAX_DAYS: u32 = 36_500;

/// Tuning knobs of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// How many days back a first or forced sync starts.
    pub lookback_days: u32,

    /// How many days ahead a forced purge of the destination reaches.
    pub future_horizon_days: u32,

    /// Pause after a full listing of a source calendar, before the next one.
    pub pacing_delay: Duration,

    /// How many destination calendars are synced at the same time.
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            future_horizon_days: 30,
            pacing_delay: Duration::ZERO,
            concurrency: 1,
        }
    }
}

/// What to sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Destination calendars to sync. Empty means all of them.
    pub calendar_ids: Vec<String>,

    /// Purge the destinations and list every source from scratch, ignoring cursors.
    pub force: bool,

    /// First day of a forced or first sync. Defaults to the configured lookback.
    pub force_from: Option<Date>,
}

/// Creates a cancellation pair. Cancelling is one-way and observed by every clone.
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

/// Triggers a [`Cancellation`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Requests every running pass to stop before its next calendar or event.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by the engine before each calendar and each event.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// A cancellation that never fires.
    pub fn never() -> Self {
        let (_, cancellation) = cancellation();
        cancellation
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // the handle is gone without cancelling, so it never will
            std::future::pending::<()>().await;
        }
    }
}

/// Errors returned by [`Syncer::sync`].
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The run was cancelled.
    #[error("sync cancelled")]
    Cancelled,

    /// At least one calendar pass or event failed. The report tells which.
    #[error("some syncs failed, consult the logs")]
    Incomplete(SyncReport),

    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No provider is registered for a calendar's platform.
    #[error("no provider registered for platform {0}")]
    ProviderUnavailable(Platform),
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One entry per destination calendar, ordered by id.
    pub destinations: Vec<DestinationReport>,
}

impl SyncReport {
    /// Returns whether every pass and every event succeeded.
    pub fn is_complete(&self) -> bool {
        self.destinations.iter().all(DestinationReport::is_complete)
    }

    /// Sums the counters of every source pass.
    pub fn totals(&self) -> Counts {
        self.destinations
            .iter()
            .flat_map(|d| d.sources.iter())
            .fold(Counts::default(), |acc, s| acc + s.counts)
    }
}

/// Outcome for one destination calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationReport {
    /// Local id of the destination calendar.
    pub calendar_id: String,

    /// Events deleted by a forced purge.
    pub purged: usize,

    /// Events a forced purge failed to delete.
    pub purge_failed: usize,

    /// One entry per source calendar, in processing order.
    pub sources: Vec<SourceReport>,

    /// Fatal error that stopped the destination before its sources ran.
    pub error: Option<String>,
}

impl DestinationReport {
    fn new(calendar_id: &str) -> Self {
        Self {
            calendar_id: calendar_id.to_string(),
            ..Default::default()
        }
    }

    /// Returns whether the destination and all its sources synced cleanly.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
            && self.purge_failed == 0
            && self.sources.iter().all(SourceReport::is_complete)
    }
}

/// Outcome for one source calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    /// Local id of the source calendar.
    pub calendar_id: String,

    /// How the events were listed.
    pub mode: SyncMode,

    /// Per-event counters.
    pub counts: Counts,

    /// Whether a new cursor was persisted.
    pub cursor_saved: bool,

    /// Fatal error that aborted the pass.
    pub error: Option<String>,
}

impl SourceReport {
    fn new(calendar_id: &str) -> Self {
        Self {
            calendar_id: calendar_id.to_string(),
            ..Default::default()
        }
    }

    /// Returns whether the pass completed without any failure.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.counts.failed == 0
    }
}

/// How a source calendar was listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Nothing was listed.
    #[default]
    Skipped,

    /// Every event from the given day on.
    Full {
        /// First day listed.
        since: Date,
    },

    /// Changes since the stored cursor.
    Incremental,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Skipped => write!(f, "skipped"),
            SyncMode::Full { since } => write!(f, "full since {since}"),
            SyncMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// Per-event counters of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Events created in the destination.
    pub created: usize,

    /// Destination events overwritten.
    pub updated: usize,

    /// Destination events removed.
    pub deleted: usize,

    /// Source events that needed no action.
    pub skipped: usize,

    /// Events whose provider call failed.
    pub failed: usize,
}

impl Counts {
    /// Number of events handled, successfully or not.
    pub fn processed(&self) -> usize {
        self.created + self.updated + self.deleted + self.skipped + self.failed
    }
}

impl std::ops::Add for Counts {
    type Output = Counts;

    fn add(self, rhs: Self) -> Self::Output {
        Counts {
            created: self.created + rhs.created,
            updated: self.updated + rhs.updated,
            deleted: self.deleted + rhs.deleted,
            skipped: self.skipped + rhs.skipped,
            failed: self.failed + rhs.failed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cancelled;

enum PassError {
    Cancelled,
    Fatal(SyncError),
}

impl From<StorageError> for PassError {
    fn from(err: StorageError) -> Self {
        PassError::Fatal(err.into())
    }
}

impl From<ProviderError> for PassError {
    fn from(err: ProviderError) -> Self {
        PassError::Fatal(err.into())
    }
}

enum Listing<'a> {
    Since(Date),
    Cursor(&'a str),
}

/// Mirrors the events of source calendars into their destination calendars.
pub struct Syncer {
    storage: Arc<dyn Storage>,
    providers: Providers,
    filter: EventFilter,
    options: SyncOptions,
    today: Date,
}

impl Syncer {
    /// Creates an engine over `storage` using the given providers.
    pub fn new(storage: Arc<dyn Storage>, providers: Providers) -> Self {
        Self {
            storage,
            providers,
            filter: EventFilter::default(),
            options: SyncOptions::default(),
            today: Zoned::now().date(),
        }
    }

    /// Replaces the event filter.
    #[must_use]
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replaces the engine options.
    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Pins the current day, which anchors the lookback and purge windows.
    #[must_use]
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }

    /// Runs one sync over the requested destination calendars.
    ///
    /// Failures of single events or calendars do not stop the run; they are collected in the
    /// report carried by [`SyncError::Incomplete`].
    #[tracing::instrument(skip_all, fields(force = request.force))]
    pub async fn sync(
        &self,
        request: &SyncRequest,
        cancel: &Cancellation,
    ) -> Result<SyncReport, SyncError> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let destinations = self
            .storage
            .destination_calendars(&request.calendar_ids)
            .await?;
        tracing::info!(count = destinations.len(), "syncing destination calendars");

        let results: Vec<_> = stream::iter(destinations)
            .map(|destination| self.sync_destination(destination, request, cancel))
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut report = SyncReport::default();
        let mut cancelled = false;
        for result in results {
            match result {
                Ok(destination) => report.destinations.push(destination),
                Err(Cancelled) => cancelled = true,
            }
        }
        report
            .destinations
            .sort_by(|a, b| a.calendar_id.cmp(&b.calendar_id));

        if cancelled {
            tracing::warn!("sync cancelled");
            return Err(SyncError::Cancelled);
        }

        let totals = report.totals();
        if report.is_complete() {
            tracing::info!(
                created = totals.created,
                updated = totals.updated,
                deleted = totals.deleted,
                "sync complete"
            );
            Ok(report)
        } else {
            tracing::error!(failed = totals.failed, "sync complete with errors");
            Err(SyncError::Incomplete(report))
        }
    }

    #[tracing::instrument(skip_all, fields(destination = %destination.id))]
    async fn sync_destination(
        &self,
        destination: Calendar,
        request: &SyncRequest,
        cancel: &Cancellation,
    ) -> Result<DestinationReport, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let mut report = DestinationReport::new(&destination.id);
        let Some(provider) = self.providers.get(destination.account.platform) else {
            let err = SyncError::ProviderUnavailable(destination.account.platform);
            tracing::error!(%err, "cannot sync destination");
            report.error = Some(err.to_string());
            return Ok(report);
        };

        if request.force {
            self.purge(provider.as_ref(), &destination, request, &mut report, cancel)
                .await?;
        }

        let sources = match self.storage.source_calendars(&destination.id).await {
            Ok(sources) => sources,
            Err(err) => {
                tracing::error!(%err, "failed to load source calendars");
                report.error = Some(err.to_string());
                return Ok(report);
            }
        };

        let count = sources.len();
        for (i, source) in sources.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }

            let source_report = self
                .sync_source(provider.as_ref(), &destination, source, request, cancel)
                .await?;
            let paced = matches!(source_report.mode, SyncMode::Full { .. });
            report.sources.push(source_report);

            if paced && i + 1 < count && !self.options.pacing_delay.is_zero() {
                tracing::debug!(delay = ?self.options.pacing_delay, "pacing before next calendar");
                tokio::select! {
                    () = tokio::time::sleep(self.options.pacing_delay) => {}
                    () = cancel.cancelled() => return Err(Cancelled),
                }
            }
        }

        Ok(report)
    }

    /// Deletes every destination event inside the forced window, best effort.
    async fn purge(
        &self,
        provider: &dyn Provider,
        destination: &Calendar,
        request: &SyncRequest,
        report: &mut DestinationReport,
        cancel: &Cancellation,
    ) -> Result<(), Cancelled> {
        let from = request.force_from.unwrap_or_else(|| self.default_since());
        let until = self
            .today
            .saturating_add(days(self.options.future_horizon_days));
        tracing::info!(%from, %until, "purging destination calendar");

        let mut ids = Vec::new();
        match provider.events_between(destination, from, until).await {
            Ok(mut stream) => {
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(event) => ids.push(event.id),
                        Err(err) => {
                            tracing::warn!(%err, "failed to list destination events");
                            report.purge_failed += 1;
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to list destination events");
                report.purge_failed += 1;
            }
        }

        for id in ids {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }

            if let Err(err) = provider.delete_event(destination, &id).await {
                tracing::warn!(event = %id, %err, "failed to delete destination event");
                report.purge_failed += 1;
                continue;
            }
            if let Err(err) = self.storage.delete_mapping(destination, &id).await {
                tracing::warn!(event = %id, %err, "failed to delete mapping");
                report.purge_failed += 1;
                continue;
            }
            report.purged += 1;
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, fields(source = %source.id))]
    async fn sync_source(
        &self,
        destination_provider: &dyn Provider,
        destination: &Calendar,
        source: &Calendar,
        request: &SyncRequest,
        cancel: &Cancellation,
    ) -> Result<SourceReport, Cancelled> {
        let mut report = SourceReport::new(&source.id);
        let Some(source_provider) = self.providers.get(source.account.platform) else {
            let err = SyncError::ProviderUnavailable(source.account.platform);
            tracing::error!(%err, "cannot sync source");
            report.error = Some(err.to_string());
            return Ok(report);
        };

        let ctx = Pass {
            source_provider: source_provider.as_ref(),
            destination_provider,
            destination,
            source,
        };

        let since = request.force_from.unwrap_or_else(|| self.default_since());
        let mut result = if request.force || !source.has_cursor() {
            report.mode = SyncMode::Full { since };
            self.pass(&ctx, Listing::Since(since), &mut report, cancel)
                .await
        } else {
            report.mode = SyncMode::Incremental;
            self.pass(&ctx, Listing::Cursor(&source.cursor), &mut report, cancel)
                .await
        };

        let cursor_expired = matches!(
            &result,
            Err(PassError::Fatal(SyncError::Provider(err))) if err.is_cursor_expired()
        );
        if cursor_expired && report.counts.processed() == 0 {
            tracing::info!("sync cursor expired, falling back to a full listing");
            report.mode = SyncMode::Full { since };
            result = self
                .pass(&ctx, Listing::Since(since), &mut report, cancel)
                .await;
        }

        match result {
            Ok(()) => {
                tracing::info!(
                    created = report.counts.created,
                    updated = report.counts.updated,
                    deleted = report.counts.deleted,
                    skipped = report.counts.skipped,
                    failed = report.counts.failed,
                    "source calendar synced"
                );
                Ok(report)
            }
            Err(PassError::Cancelled) => Err(Cancelled),
            Err(PassError::Fatal(err)) => {
                tracing::error!(%err, "source calendar pass failed");
                report.error = Some(err.to_string());
                Ok(report)
            }
        }
    }

    /// Drains one listing of a source calendar and applies every event.
    async fn pass(
        &self,
        ctx: &Pass<'_>,
        listing: Listing<'_>,
        report: &mut SourceReport,
        cancel: &Cancellation,
    ) -> Result<(), PassError> {
        let mut stream: EventStream = match listing {
            Listing::Since(since) => ctx.source_provider.events_from(ctx.source, since).await?,
            Listing::Cursor(cursor) => ctx.source_provider.events_since(ctx.source, cursor).await?,
        };

        loop {
            if cancel.is_cancelled() {
                return Err(PassError::Cancelled);
            }

            let Some(item) = stream.next().await else {
                break;
            };
            let event = item?;
            self.apply(ctx, &event, &mut report.counts).await?;
        }

        if let Some(cursor) = stream.cursor() {
            self.storage.save_cursor(ctx.source, cursor).await?;
            report.cursor_saved = true;
            tracing::debug!("cursor saved");
        }

        Ok(())
    }

    /// Applies one source event to the destination. Only store failures are returned.
    async fn apply(
        &self,
        ctx: &Pass<'_>,
        event: &Event,
        counts: &mut Counts,
    ) -> Result<(), StorageError> {
        let mapped = self
            .storage
            .destination_event_id(ctx.destination, ctx.source, &event.id)
            .await?;
        let dropped = event.is_cancelled() || self.filter.should_ignore(event);

        match (dropped, mapped) {
            (true, Some(destination_id)) => {
                match ctx
                    .destination_provider
                    .delete_event(ctx.destination, &destination_id)
                    .await
                {
                    Ok(()) => {
                        self.storage
                            .delete_mapping(ctx.destination, &destination_id)
                            .await?;
                        tracing::debug!(event = %event.id, destination_event = %destination_id, "deleted");
                        counts.deleted += 1;
                    }
                    Err(err) => {
                        tracing::warn!(event = %event.id, %err, "failed to delete event");
                        counts.failed += 1;
                    }
                }
            }

            (true, None) => counts.skipped += 1,

            (false, Some(destination_id)) => {
                let mirrored = Event {
                    id: destination_id.clone(),
                    ..event.clone()
                };
                match ctx
                    .destination_provider
                    .update_event(ctx.destination, ctx.source.prefix(), &mirrored)
                    .await
                {
                    Ok(_) => {
                        tracing::debug!(event = %event.id, destination_event = %destination_id, "updated");
                        counts.updated += 1;
                    }
                    Err(err) if err.is_not_found() => {
                        tracing::info!(event = %event.id, "mirrored event is gone, creating it again");
                        self.storage
                            .delete_mapping(ctx.destination, &destination_id)
                            .await?;
                        self.create(ctx, event, counts).await?;
                    }
                    Err(err) => {
                        tracing::warn!(event = %event.id, %err, "failed to update event");
                        counts.failed += 1;
                    }
                }
            }

            (false, None) => self.create(ctx, event, counts).await?,
        }

        Ok(())
    }

    async fn create(
        &self,
        ctx: &Pass<'_>,
        event: &Event,
        counts: &mut Counts,
    ) -> Result<(), StorageError> {
        let created = match ctx
            .destination_provider
            .create_event(ctx.destination, ctx.source.prefix(), event)
            .await
        {
            Ok(created) => created,
            Err(err) => {
                tracing::warn!(event = %event.id, %err, "failed to create event");
                counts.failed += 1;
                return Ok(());
            }
        };

        if let Err(err) = self
            .storage
            .record_mapping(ctx.destination, ctx.source, &created.id, &event.id)
            .await
        {
            tracing::error!(event = %event.id, destination_event = %created.id, %err, "failed to record mapping, removing the created event");
            if let Err(err) = ctx
                .destination_provider
                .delete_event(ctx.destination, &created.id)
                .await
            {
                tracing::warn!(destination_event = %created.id, %err, "failed to remove the created event");
            }
            return Err(err);
        }

        tracing::debug!(event = %event.id, destination_event = %created.id, "created");
        counts.created += 1;
        Ok(())
    }

    fn default_since(&self) -> Date {
        self.today.saturating_sub(days(self.options.lookback_days))
    }
}

impl fmt::Debug for Syncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Syncer")
            .field("providers", &self.providers)
            .field("filter", &self.filter)
            .field("options", &self.options)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

struct Pass<'a> {
    source_provider: &'a dyn Provider,
    destination_provider: &'a dyn Provider,
    destination: &'a Calendar,
    source: &'a Calendar,
}

fn days(n: u32) -> Span {
    Span::new().days(i64::from(n.min(MAX_DAYS)))
}
