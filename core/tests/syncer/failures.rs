// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Failure handling: store errors, missing providers and cancellation.

use std::sync::Arc;

use synccal_core::{
    Cancellation, Event, Platform, Providers, SyncError, SyncReport, SyncRequest, Syncer,
    cancellation,
};

use crate::common::{
    Call, FakeProvider, Listing, MemoryStorage, TODAY, accepted_event, destination_calendar,
    source_calendar, syncer,
};

fn setup(events: Vec<Event>) -> (Arc<MemoryStorage>, Arc<FakeProvider>) {
    let source = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&source, Listing::events(events, "c1"));
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), source]));
    (storage, provider)
}

fn incomplete(result: Result<SyncReport, SyncError>) -> SyncReport {
    match result {
        Err(SyncError::Incomplete(report)) => report,
        other => panic!("expected an incomplete sync, got {other:?}"),
    }
}

#[tokio::test]
async fn unrecorded_creation_is_rolled_back() {
    // Arrange
    let (storage, provider) = setup(vec![
        accepted_event("e1", "Standup"),
        accepted_event("e2", "Retro"),
    ]);
    storage.fail_record();

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let report = incomplete(result);
    assert_eq!(
        provider.writes(),
        vec![
            Call::Create {
                calendar: "google/personal/primary".to_string(),
                source_event: "e1".to_string(),
                summary: "[W] Standup".to_string(),
            },
            Call::Delete {
                calendar: "google/personal/primary".to_string(),
                event: "dst-1".to_string(),
            },
        ]
    );
    let pass = &report.destinations[0].sources[0];
    assert!(pass.error.is_some());
    assert!(!pass.cursor_saved);
    assert_eq!(storage.mapping_count(), 0);
}

#[tokio::test]
async fn failed_lookup_aborts_pass_without_writes() {
    // Arrange
    let (storage, provider) = setup(vec![accepted_event("e1", "Standup")]);
    storage.fail_lookup();

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let report = incomplete(result);
    assert!(provider.writes().is_empty());
    assert!(report.destinations[0].sources[0].error.is_some());
    assert_eq!(storage.cursor(&source_calendar("work", "[W] ", "")), None);
}

#[tokio::test]
async fn failed_cursor_save_reports_error() {
    // Arrange
    let (storage, provider) = setup(vec![accepted_event("e1", "Standup")]);
    storage.fail_save_cursor();

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let report = incomplete(result);
    let pass = &report.destinations[0].sources[0];
    assert_eq!(pass.counts.created, 1);
    assert!(!pass.cursor_saved);
    assert!(pass.error.is_some());
}

#[tokio::test]
async fn failed_update_is_counted_and_mapping_kept() {
    // Arrange
    let (storage, provider) = setup(vec![accepted_event("e1", "Standup")]);
    let source = source_calendar("work", "[W] ", "");
    storage.insert_mapping(&destination_calendar(), &source, "d-1", "e1");
    provider.fail_update("d-1");

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let report = incomplete(result);
    assert_eq!(report.totals().failed, 1);
    assert_eq!(
        storage.mapping(&destination_calendar(), &source, "e1"),
        Some("d-1".to_string())
    );
    assert_eq!(storage.cursor(&source), Some("c1".to_string()));
}

#[tokio::test]
async fn failed_delete_keeps_mapping() {
    // Arrange
    let (storage, provider) = setup(vec![Event::cancelled("e1")]);
    let source = source_calendar("work", "[W] ", "");
    storage.insert_mapping(&destination_calendar(), &source, "d-1", "e1");
    provider.fail_delete("d-1");

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let report = incomplete(result);
    assert_eq!(report.totals().failed, 1);
    assert_eq!(storage.mapping_count(), 1);
}

#[tokio::test]
async fn missing_provider_is_reported_per_destination() {
    // Arrange
    let (storage, _) = setup(vec![accepted_event("e1", "Standup")]);
    let syncer = Syncer::new(storage.clone(), Providers::new()).with_today(TODAY);

    // Act
    let result = syncer
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await;

    // Assert
    let report = incomplete(result);
    let destination = &report.destinations[0];
    assert!(destination.sources.is_empty());
    let error = destination.error.as_deref().unwrap();
    assert!(error.contains(&Platform::Google.to_string()));
}

#[tokio::test]
async fn unknown_destination_fails_the_run() {
    // Arrange
    let (storage, provider) = setup(Vec::new());
    let request = SyncRequest {
        calendar_ids: vec!["google/nobody/primary".to_string()],
        ..Default::default()
    };

    // Act
    let result = syncer(&storage, &provider)
        .sync(&request, &Cancellation::never())
        .await;

    // Assert
    assert!(matches!(result, Err(SyncError::Storage(_))));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn cancelled_before_start_makes_no_calls() {
    // Arrange
    let (storage, provider) = setup(vec![accepted_event("e1", "Standup")]);
    let (handle, cancel) = cancellation();
    handle.cancel();

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &cancel)
        .await;

    // Assert
    assert!(matches!(result, Err(SyncError::Cancelled)));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn cancellation_stops_before_next_event() {
    // Arrange
    let (storage, provider) = setup(vec![
        accepted_event("e1", "Standup"),
        accepted_event("e2", "Retro"),
    ]);
    let (handle, cancel) = cancellation();
    provider.cancel_on_create(handle);

    // Act
    let result = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &cancel)
        .await;

    // Assert
    assert!(matches!(result, Err(SyncError::Cancelled)));
    let writes = provider.writes();
    assert_eq!(writes.len(), 1);
    assert!(matches!(&writes[0], Call::Create { source_event, .. } if source_event == "e1"));
    assert_eq!(storage.mapping_count(), 1);
    assert_eq!(storage.cursor(&source_calendar("work", "[W] ", "")), None);
}
