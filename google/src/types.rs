// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Wire types of the Calendar v3 REST API, reduced to the fields the sync uses.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// One page of `events.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    /// Events of the page.
    #[serde(default)]
    pub items: Vec<ApiEvent>,

    /// Token of the next page, absent on the last one.
    pub next_page_token: Option<String>,

    /// Sync token, present on the last page only.
    pub next_sync_token: Option<String>,
}

/// An event resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    /// Event id, assigned by the server.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// `confirmed`, `tentative` or `cancelled`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,

    /// Type of the event, e.g. `default` or `outOfOffice`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Title.
    #[serde(default)]
    pub summary: String,

    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,

    /// End time, exclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,

    /// Creator of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<Person>,

    /// Attendees of the event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,

    /// Reminder settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
}

/// Start or end of an event: a date for all-day events, an instant otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// Date of an all-day event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,

    /// Instant of a timed event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<Timestamp>,

    /// IANA time zone of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// The creator of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Email address.
    #[serde(default)]
    pub email: String,

    /// Whether this is the authenticated user.
    #[serde(default, rename = "self")]
    pub is_self: bool,
}

/// An attendee of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Email address.
    #[serde(default)]
    pub email: String,

    /// Whether this is the authenticated user.
    #[serde(default, rename = "self")]
    pub is_self: bool,

    /// `needsAction`, `declined`, `tentative` or `accepted`.
    #[serde(default)]
    pub response_status: String,
}

/// Reminder settings of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    /// Whether the calendar's default reminders apply.
    pub use_default: bool,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// The error.
    pub error: ErrorBody,
}

/// Details of an API error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// HTTP status.
    #[serde(default)]
    pub code: u16,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,

    /// Individual error items.
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

/// One item of an API error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorItem {
    /// Machine-readable reason, e.g. `rateLimitExceeded`.
    #[serde(default)]
    pub reason: String,
}
