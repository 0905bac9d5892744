// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! How each source event is reconciled with the destination.

use std::sync::Arc;

use synccal_core::{Cancellation, Event, EventFilter, ResponseStatus, SyncRequest};

use crate::common::{
    Call, FakeProvider, Listing, MemoryStorage, StorageCall, accepted_event,
    destination_calendar, source_calendar, syncer,
};

fn setup(events: Vec<Event>) -> (Arc<MemoryStorage>, Arc<FakeProvider>) {
    let destination = destination_calendar();
    let source = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&source, Listing::events(events, "c1"));
    let storage = Arc::new(MemoryStorage::new(vec![destination, source]));
    (storage, provider)
}

fn declined(id: &str, summary: &str) -> Event {
    Event {
        response_status: Some(ResponseStatus::Declined),
        ..accepted_event(id, summary)
    }
}

#[tokio::test]
async fn unmapped_event_is_created_with_prefix() {
    // Arrange
    let (storage, provider) = setup(vec![accepted_event("e1", "Standup")]);

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(
        provider.writes(),
        vec![Call::Create {
            calendar: "google/personal/primary".to_string(),
            source_event: "e1".to_string(),
            summary: "[W] Standup".to_string(),
        }]
    );
    let source = source_calendar("work", "[W] ", "");
    assert_eq!(
        storage.mapping(&destination_calendar(), &source, "e1"),
        Some("dst-1".to_string())
    );
    assert_eq!(report.totals().created, 1);
}

#[tokio::test]
async fn mapped_event_is_updated_not_duplicated() {
    // Arrange
    let (storage, provider) = setup(vec![accepted_event("e1", "Standup (moved)")]);
    let source = source_calendar("work", "[W] ", "");
    storage.insert_mapping(&destination_calendar(), &source, "d-1", "e1");

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(
        provider.writes(),
        vec![Call::Update {
            calendar: "google/personal/primary".to_string(),
            event: "d-1".to_string(),
            summary: "[W] Standup (moved)".to_string(),
        }]
    );
    assert_eq!(storage.mapping_count(), 1);
    assert_eq!(report.totals().updated, 1);
    assert_eq!(report.totals().created, 0);
}

#[tokio::test]
async fn cancelled_unmapped_event_makes_no_calls() {
    // Arrange
    let (storage, provider) = setup(vec![Event::cancelled("e1")]);

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert!(provider.writes().is_empty());
    assert_eq!(storage.mapping_count(), 0);
    assert_eq!(report.totals().skipped, 1);
}

#[tokio::test]
async fn cancelled_mapped_event_is_deleted_with_its_mapping() {
    // Arrange
    let (storage, provider) = setup(vec![Event::cancelled("e1")]);
    let source = source_calendar("work", "[W] ", "");
    storage.insert_mapping(&destination_calendar(), &source, "d-1", "e1");

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(
        provider.writes(),
        vec![Call::Delete {
            calendar: "google/personal/primary".to_string(),
            event: "d-1".to_string(),
        }]
    );
    assert_eq!(storage.mapping_count(), 0);
    assert_eq!(report.totals().deleted, 1);
}

#[tokio::test]
async fn newly_ignored_mapped_event_is_deleted() {
    // Arrange
    let (storage, provider) = setup(vec![declined("e1", "Planning")]);
    let source = source_calendar("work", "[W] ", "");
    storage.insert_mapping(&destination_calendar(), &source, "d-1", "e1");
    let filter = EventFilter {
        ignore_declined_events: true,
        ..Default::default()
    };

    // Act
    syncer(&storage, &provider)
        .with_filter(filter)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let writes = provider.writes();
    assert_eq!(writes.len(), 1);
    assert!(matches!(&writes[0], Call::Delete { event, .. } if event == "d-1"));
    let deletes = storage
        .calls()
        .into_iter()
        .filter(|c| matches!(c, StorageCall::DeleteMapping { .. }))
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn ignored_unmapped_event_is_skipped() {
    // Arrange
    let (storage, provider) = setup(vec![
        declined("e1", "Planning"),
        accepted_event("e2", "❇️ Lunch (via Clockwise)"),
    ]);
    let filter = EventFilter {
        ignore_declined_events: true,
        ..Default::default()
    };

    // Act
    let report = syncer(&storage, &provider)
        .with_filter(filter)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert!(provider.writes().is_empty());
    assert_eq!(report.totals().skipped, 2);
}

#[tokio::test]
async fn declined_event_is_mirrored_without_filter() {
    // Arrange
    let (storage, provider) = setup(vec![declined("e1", "Planning")]);

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(provider.writes().len(), 1);
    assert_eq!(report.totals().created, 1);
}

#[tokio::test]
async fn vanished_destination_event_is_recreated() {
    // Arrange
    let (storage, provider) = setup(vec![accepted_event("e1", "Standup")]);
    let destination = destination_calendar();
    let source = source_calendar("work", "[W] ", "");
    storage.insert_mapping(&destination, &source, "d-1", "e1");
    provider.missing_on_update("d-1");

    // Act
    let report = syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let writes = provider.writes();
    assert_eq!(writes.len(), 2);
    assert!(matches!(&writes[0], Call::Update { event, .. } if event == "d-1"));
    assert!(matches!(&writes[1], Call::Create { source_event, .. } if source_event == "e1"));
    assert_eq!(
        storage.mapping(&destination, &source, "e1"),
        Some("dst-1".to_string())
    );
    assert_eq!(report.totals().created, 1);
    assert_eq!(report.totals().updated, 0);
}

#[tokio::test]
async fn sources_sharing_event_ids_do_not_collide() {
    // Arrange
    let destination = destination_calendar();
    let work = source_calendar("work", "[W] ", "");
    let club = source_calendar("club", "[C] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&work, Listing::events(vec![accepted_event("e1", "Standup")], "w1"));
    provider.on_events_from(&club, Listing::events(vec![accepted_event("e1", "Meetup")], "c1"));
    let storage = Arc::new(MemoryStorage::new(vec![destination.clone(), work.clone(), club.clone()]));

    // Act
    syncer(&storage, &provider)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(provider.writes().len(), 2);
    assert!(storage.mapping(&destination, &work, "e1").is_some());
    assert!(storage.mapping(&destination, &club, "e1").is_some());
    assert_ne!(
        storage.mapping(&destination, &work, "e1"),
        storage.mapping(&destination, &club, "e1")
    );
}
