// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Conversion between API events and engine events.

use synccal_core::{Event, EventKind, EventTime, ResponseStatus};

use crate::types::{ApiEvent, EventDateTime, Reminders};

const STATUS_CANCELLED: &str = "cancelled";

/// Converts a listed event. Cancelled items become id-only sentinels.
pub fn from_api(event: ApiEvent) -> Event {
    if event.status == STATUS_CANCELLED {
        return Event::cancelled(event.id);
    }

    let response_status = event
        .attendees
        .iter()
        .rfind(|a| a.is_self)
        .and_then(|a| a.response_status.parse::<ResponseStatus>().ok());
    let creator = event.creator.unwrap_or_default();

    Event {
        kind: event
            .event_type
            .as_deref()
            .map(EventKind::from_str_lossy)
            .unwrap_or_default(),
        summary: event.summary,
        description: event.description,
        start: event.start.and_then(time_from_api),
        end: event.end.and_then(time_from_api),
        created_by: creator.email,
        created_by_me: creator.is_self,
        response_status,
        attendees: u32::try_from(event.attendees.len()).unwrap_or(u32::MAX),
        id: event.id,
    }
}

/// Builds the body written to the destination, with `prefix` prepended to the title.
pub fn to_api(prefix: &str, event: &Event) -> ApiEvent {
    // the API rejects other types on insert
    let event_type = match event.kind {
        EventKind::OutOfOffice | EventKind::FocusTime => Some(event.kind.as_str().to_string()),
        _ => None,
    };

    ApiEvent {
        event_type,
        summary: format!("{prefix}{}", event.summary),
        description: event.description.clone(),
        start: event.start.map(time_to_api),
        end: event.end.map(time_to_api),
        reminders: Some(Reminders { use_default: true }),
        ..Default::default()
    }
}

fn time_from_api(time: EventDateTime) -> Option<EventTime> {
    match (time.date_time, time.date) {
        (Some(instant), _) => Some(EventTime::DateTime(instant)),
        (None, Some(date)) => Some(EventTime::Date(date)),
        (None, None) => None,
    }
}

fn time_to_api(time: EventTime) -> EventDateTime {
    match time {
        EventTime::Date(date) => EventDateTime {
            date: Some(date),
            ..Default::default()
        },
        EventTime::DateTime(instant) => EventDateTime {
            date_time: Some(instant),
            ..Default::default()
        },
    }
}
