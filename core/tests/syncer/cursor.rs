// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Full and incremental listings, and when cursors advance.

use std::sync::Arc;

use jiff::civil::date;
use synccal_core::{
    Cancellation, ProviderError, SyncError, SyncMode, SyncOptions, SyncRequest,
};

use crate::common::{
    Call, FakeProvider, Listing, MemoryStorage, accepted_event, destination_calendar,
    source_calendar, syncer,
};

#[tokio::test]
async fn first_sync_lists_from_lookback() {
    // Arrange
    let source = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&source, Listing::events(vec![accepted_event("e1", "Standup")], "c1"));
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source.clone()]));

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(
        provider.calls()[0],
        Call::EventsFrom {
            calendar: source.id.clone(),
            since: date(2024, 1, 3),
        }
    );
    let pass = &report.destinations[0].sources[0];
    assert_eq!(pass.mode, SyncMode::Full { since: date(2024, 1, 3) });
    assert!(pass.cursor_saved);
    assert_eq!(storage.cursor(&source), Some("c1".to_string()));
}

#[tokio::test]
async fn lookback_follows_options() {
    // Arrange
    let source = source_calendar("work", "", "");
    let provider = Arc::new(FakeProvider::new());
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source.clone()]));
    let options = SyncOptions {
        lookback_days: 30,
        ..Default::default()
    };

    // Act
    syncer(&storage, &provider)
        .with_options(options)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(
        provider.calls(),
        vec![Call::EventsFrom {
            calendar: source.id.clone(),
            since: date(2023, 12, 11),
        }]
    );
}

#[tokio::test]
async fn stored_cursor_drives_incremental_listing() {
    // Arrange
    let source = source_calendar("work", "[W] ", "c0");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_since(&source, Listing::events(vec![accepted_event("e1", "Standup")], "c1"));
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source.clone()]));

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let calls = provider.calls();
    assert_eq!(
        calls[0],
        Call::EventsSince {
            calendar: source.id.clone(),
            cursor: "c0".to_string(),
        }
    );
    assert!(!calls.iter().any(|c| matches!(c, Call::EventsFrom { .. })));
    assert_eq!(report.destinations[0].sources[0].mode, SyncMode::Incremental);
    assert_eq!(storage.cursor(&source), Some("c1".to_string()));
}

#[tokio::test]
async fn cursor_advances_despite_failed_event() {
    // Arrange
    let source = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(
        &source,
        Listing::events(
            vec![
                accepted_event("e1", "One"),
                accepted_event("e2", "Two"),
                accepted_event("e3", "Three"),
            ],
            "c1",
        ),
    );
    provider.fail_create("e2");
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source.clone()]));

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let Err(SyncError::Incomplete(report)) = result else {
        panic!("expected an incomplete sync, got {result:?}");
    };
    let pass = &report.destinations[0].sources[0];
    assert_eq!(pass.counts.created, 2);
    assert_eq!(pass.counts.failed, 1);
    assert!(pass.cursor_saved);
    assert_eq!(storage.cursor(&source), Some("c1".to_string()));
    assert_eq!(storage.mapping_count(), 2);
}

#[tokio::test]
async fn failed_listing_does_not_stop_other_sources() {
    // Arrange
    let work = source_calendar("work", "[W] ", "");
    let club = source_calendar("club", "[C] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&work, Listing::Refused(ProviderError::transient("boom")));
    provider.on_events_from(&club, Listing::events(vec![accepted_event("e1", "Meetup")], "c1"));
    let storage = Arc::new(MemoryStorage::new(vec![
        destination_calendar(),
        work.clone(),
        club.clone(),
    ]));

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let Err(SyncError::Incomplete(report)) = result else {
        panic!("expected an incomplete sync, got {result:?}");
    };
    let sources = &report.destinations[0].sources;
    let failed = sources.iter().find(|s| s.calendar_id == work.id).unwrap();
    let synced = sources.iter().find(|s| s.calendar_id == club.id).unwrap();
    assert!(failed.error.is_some());
    assert!(!failed.cursor_saved);
    assert!(synced.is_complete());
    assert_eq!(synced.counts.created, 1);
    assert_eq!(storage.cursor(&work), None);
    assert_eq!(storage.cursor(&club), Some("c1".to_string()));
}

#[tokio::test]
async fn interrupted_listing_keeps_old_cursor() {
    // Arrange
    let source = source_calendar("work", "[W] ", "c0");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_since(
        &source,
        Listing::FailsAfter(
            vec![accepted_event("e1", "Standup")],
            ProviderError::transient("connection reset"),
        ),
    );
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source.clone()]));

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let Err(SyncError::Incomplete(report)) = result else {
        panic!("expected an incomplete sync, got {result:?}");
    };
    let pass = &report.destinations[0].sources[0];
    assert_eq!(pass.counts.created, 1);
    assert!(pass.error.is_some());
    assert!(!pass.cursor_saved);
    assert_eq!(storage.cursor(&source), None);
}

#[tokio::test]
async fn expired_cursor_falls_back_to_full_listing() {
    // Arrange
    let source = source_calendar("work", "[W] ", "stale");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_since(&source, Listing::Refused(ProviderError::cursor_expired("gone")));
    provider.on_events_from(&source, Listing::events(vec![accepted_event("e1", "Standup")], "fresh"));
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source.clone()]));

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let calls = provider.calls();
    assert!(matches!(&calls[0], Call::EventsSince { cursor, .. } if cursor == "stale"));
    assert_eq!(
        calls[1],
        Call::EventsFrom {
            calendar: source.id.clone(),
            since: date(2024, 1, 3),
        }
    );
    let pass = &report.destinations[0].sources[0];
    assert_eq!(pass.mode, SyncMode::Full { since: date(2024, 1, 3) });
    assert_eq!(pass.counts.created, 1);
    assert_eq!(storage.cursor(&source), Some("fresh".to_string()));
}

#[tokio::test]
async fn exhausted_listing_without_cursor_saves_nothing() {
    // Arrange
    let source = source_calendar("work", "", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&source, Listing::Events(vec![accepted_event("e1", "Standup")], None));
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source.clone()]));

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert!(!report.destinations[0].sources[0].cursor_saved);
    assert_eq!(storage.cursor(&source), None);
}
