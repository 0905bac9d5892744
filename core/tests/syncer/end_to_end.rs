// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Whole runs: repeated syncs, the SQLite store, pacing and concurrency.

use std::sync::Arc;
use std::time::Duration;

use jiff::civil::date;
use synccal_core::{
    Calendar, CalendarLink, CalendarRole, Cancellation, LocalDb, Platform, Providers,
    SyncOptions, SyncRequest, Syncer,
};

use crate::common::{
    Call, FakeProvider, Listing, MemoryStorage, StorageCall, TODAY, accepted_event,
    destination_calendar, google_account, source_calendar, syncer,
};

fn forced_from_new_year() -> SyncRequest {
    SyncRequest {
        force: true,
        force_from: Some(date(2024, 1, 1)),
        ..Default::default()
    }
}

#[tokio::test]
async fn standup_is_mirrored_once() {
    // Arrange
    let destination = destination_calendar();
    let source = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&source, Listing::events(vec![accepted_event("e1", "Standup")], "c1"));
    let storage = Arc::new(MemoryStorage::new(vec![destination.clone(), source.clone()]));

    // Act
    syncer(&storage, &provider)
        .sync(&forced_from_new_year(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let creates: Vec<_> = provider
        .writes()
        .into_iter()
        .filter(|c| matches!(c, Call::Create { .. }))
        .collect();
    assert_eq!(
        creates,
        vec![Call::Create {
            calendar: destination.id.clone(),
            source_event: "e1".to_string(),
            summary: "[W] Standup".to_string(),
        }]
    );
    assert!(storage.calls().contains(&StorageCall::Record {
        destination_event: "dst-1".to_string(),
        source_event: "e1".to_string(),
    }));
    assert_eq!(storage.cursor(&source), Some("c1".to_string()));
}

#[tokio::test]
async fn standup_is_mirrored_through_sqlite_store() {
    // Arrange
    let db = LocalDb::open(None).await.unwrap();
    db.add_account(Platform::Google, "work", "{}").await.unwrap();
    db.add_account(Platform::Google, "personal", "{}")
        .await
        .unwrap();
    let source = db
        .link_calendar(&CalendarLink {
            name: "work".to_string(),
            source_account_id: "google/work".to_string(),
            source_calendar_id: "primary".to_string(),
            destination_account_id: "google/personal".to_string(),
            destination_calendar_id: "primary".to_string(),
            prefix: "[W] ".to_string(),
        })
        .await
        .unwrap();
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&source, Listing::events(vec![accepted_event("e1", "Standup")], "c1"));
    let db = Arc::new(db);
    let syncer = Syncer::new(db.clone(), Providers::new().with(provider.clone())).with_today(TODAY);

    // Act
    syncer
        .sync(&forced_from_new_year(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let mappings = db.event_mappings("google/personal/primary").await.unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].source_calendar_id, source.id);
    assert_eq!(mappings[0].source_event_id, "e1");
    assert_eq!(mappings[0].destination_event_id, "dst-1");
    let stored = db.calendar(&source.id).await.unwrap().unwrap();
    assert_eq!(stored.cursor, "c1");
}

#[tokio::test]
async fn repeated_sync_converges() {
    // Arrange
    let destination = destination_calendar();
    let source = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    let events = vec![accepted_event("e1", "Standup"), accepted_event("e2", "Retro")];
    provider.on_events_from(&source, Listing::events(events.clone(), "c1"));
    provider.on_events_since(&source, Listing::events(events, "c2"));
    let storage = Arc::new(MemoryStorage::new(vec![destination.clone(), source.clone()]));
    let syncer = syncer(&storage, &provider);

    // Act
    syncer
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();
    let second = syncer
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert!(provider.calls().contains(&Call::EventsSince {
        calendar: source.id.clone(),
        cursor: "c1".to_string(),
    }));
    let creates = provider
        .writes()
        .into_iter()
        .filter(|c| matches!(c, Call::Create { .. }))
        .count();
    assert_eq!(creates, 2);
    assert_eq!(second.totals().created, 0);
    assert_eq!(second.totals().updated, 2);
    assert_eq!(storage.mapping_count(), 2);
    assert_eq!(storage.cursor(&source), Some("c2".to_string()));
}

#[tokio::test]
async fn second_sync_without_changes_writes_nothing() {
    // Arrange
    let destination = destination_calendar();
    let source = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    let events = vec![accepted_event("e1", "Standup"), accepted_event("e2", "Retro")];
    provider.on_events_from(&source, Listing::events(events, "c1"));
    provider.on_events_since(&source, Listing::events(Vec::new(), "c2"));
    let storage = Arc::new(MemoryStorage::new(vec![destination.clone(), source.clone()]));
    let syncer = syncer(&storage, &provider);
    syncer
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();
    let writes_after_first = provider.writes().len();

    // Act
    let second = syncer
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert_eq!(writes_after_first, 2);
    assert_eq!(provider.writes().len(), writes_after_first);
    let totals = second.totals();
    assert_eq!(
        (totals.created, totals.updated, totals.deleted),
        (0, 0, 0)
    );
    assert_eq!(storage.mapping_count(), 2);
    assert_eq!(storage.cursor(&source), Some("c2".to_string()));
    assert!(storage.calls().contains(&StorageCall::SaveCursor {
        calendar: source.id.clone(),
        cursor: "c2".to_string(),
    }));
}

#[tokio::test(start_paused = true)]
async fn full_listings_are_paced() {
    // Arrange
    let work = source_calendar("work", "[W] ", "");
    let club = source_calendar("club", "[C] ", "");
    let provider = Arc::new(FakeProvider::new());
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), work, club]));
    let options = SyncOptions {
        pacing_delay: Duration::from_secs(60),
        ..Default::default()
    };

    // Act
    let start = tokio::time::Instant::now();
    syncer(&storage, &provider)
        .with_options(options)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(60));
    assert!(elapsed < Duration::from_secs(120));
}

#[tokio::test(start_paused = true)]
async fn incremental_listings_are_not_paced() {
    // Arrange
    let work = source_calendar("work", "[W] ", "w0");
    let club = source_calendar("club", "[C] ", "c0");
    let provider = Arc::new(FakeProvider::new());
    let storage = Arc::new(MemoryStorage::new(vec![destination_calendar(), work, club]));
    let options = SyncOptions {
        pacing_delay: Duration::from_secs(60),
        ..Default::default()
    };

    // Act
    let start = tokio::time::Instant::now();
    syncer(&storage, &provider)
        .with_options(options)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    assert!(start.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn destinations_sync_concurrently_into_ordered_report() {
    // Arrange
    let family = Calendar {
        id: "google/family/primary".to_string(),
        account: google_account("family"),
        ..destination_calendar()
    };
    let kids = Calendar {
        id: "google/kids/primary".to_string(),
        account: google_account("kids"),
        role: CalendarRole::Source {
            destination_id: family.id.clone(),
            prefix: "[K] ".to_string(),
        },
        ..source_calendar("kids", "[K] ", "")
    };
    let work = source_calendar("work", "[W] ", "");
    let provider = Arc::new(FakeProvider::new());
    provider.on_events_from(&work, Listing::events(vec![accepted_event("e1", "Standup")], "w1"));
    provider.on_events_from(&kids, Listing::events(vec![accepted_event("e1", "Soccer")], "k1"));
    let storage = Arc::new(MemoryStorage::new(vec![
        destination_calendar(),
        work.clone(),
        family.clone(),
        kids.clone(),
    ]));
    let options = SyncOptions {
        concurrency: 2,
        ..Default::default()
    };

    // Act
    let report = syncer(&storage, &provider)
        .with_options(options)
        .sync(&SyncRequest::default(), &Cancellation::never())
        .await
        .unwrap();

    // Assert
    let ids: Vec<_> = report
        .destinations
        .iter()
        .map(|d| d.calendar_id.as_str())
        .collect();
    assert_eq!(ids, vec!["google/family/primary", "google/personal/primary"]);
    assert_eq!(report.totals().created, 2);
    assert!(storage.mapping(&family, &kids, "e1").is_some());
    assert!(storage.mapping(&destination_calendar(), &work, "e1").is_some());
}
