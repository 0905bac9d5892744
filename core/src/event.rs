// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display};
use std::str::FromStr;

use jiff::Timestamp;
use jiff::civil::Date;

/// A calendar event as seen by the sync engine.
///
/// A cancelled event only carries its `id`; every other field is left at its default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Provider-assigned identifier, unique within its calendar.
    pub id: String,

    /// The kind of the event.
    pub kind: EventKind,

    /// Title of the event.
    pub summary: String,

    /// Free-form description of the event.
    pub description: String,

    /// Start of the event.
    pub start: Option<EventTime>,

    /// End of the event.
    pub end: Option<EventTime>,

    /// Email of the creator.
    pub created_by: String,

    /// Whether the authenticated user created the event.
    pub created_by_me: bool,

    /// The authenticated user's RSVP, if they are an attendee.
    pub response_status: Option<ResponseStatus>,

    /// Number of attendees.
    pub attendees: u32,
}

impl Event {
    /// Creates the id-only sentinel the providers emit for removed events.
    pub fn cancelled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response_status: Some(ResponseStatus::Cancelled),
            ..Default::default()
        }
    }

    /// Returns whether the event was deleted or cancelled upstream.
    pub fn is_cancelled(&self) -> bool {
        self.response_status == Some(ResponseStatus::Cancelled)
    }
}

/// Either a timed instant or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// All-day event boundary.
    Date(Date),

    /// Exact instant.
    DateTime(Timestamp),
}

impl Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{d}"),
            EventTime::DateTime(t) => write!(f, "{t}"),
        }
    }
}

impl From<Date> for EventTime {
    fn from(value: Date) -> Self {
        EventTime::Date(value)
    }
}

impl From<Timestamp> for EventTime {
    fn from(value: Timestamp) -> Self {
        EventTime::DateTime(value)
    }
}

/// The kind of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    /// A regular event.
    #[default]
    #[serde(rename = "default")]
    Default,

    /// An out-of-office block.
    #[serde(rename = "outOfOffice")]
    OutOfOffice,

    /// A focus-time block.
    #[serde(rename = "focusTime")]
    FocusTime,

    /// A working location marker.
    #[serde(rename = "workingLocation")]
    WorkingLocation,

    /// An event generated from email.
    #[serde(rename = "fromGmail")]
    FromGmail,

    /// A birthday.
    #[serde(rename = "birthday")]
    Birthday,
}

const KIND_DEFAULT: &str = "default";
const KIND_OUT_OF_OFFICE: &str = "outOfOffice";
const KIND_FOCUS_TIME: &str = "focusTime";
const KIND_WORKING_LOCATION: &str = "workingLocation";
const KIND_FROM_GMAIL: &str = "fromGmail";
const KIND_BIRTHDAY: &str = "birthday";

impl EventKind {
    /// Returns the wire name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::Default => KIND_DEFAULT,
            EventKind::OutOfOffice => KIND_OUT_OF_OFFICE,
            EventKind::FocusTime => KIND_FOCUS_TIME,
            EventKind::WorkingLocation => KIND_WORKING_LOCATION,
            EventKind::FromGmail => KIND_FROM_GMAIL,
            EventKind::Birthday => KIND_BIRTHDAY,
        }
    }

    /// Parses the wire name, falling back to [`EventKind::Default`] for unknown kinds.
    pub fn from_str_lossy(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl AsRef<str> for EventKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            KIND_DEFAULT => Ok(EventKind::Default),
            KIND_OUT_OF_OFFICE => Ok(EventKind::OutOfOffice),
            KIND_FOCUS_TIME => Ok(EventKind::FocusTime),
            KIND_WORKING_LOCATION => Ok(EventKind::WorkingLocation),
            KIND_FROM_GMAIL => Ok(EventKind::FromGmail),
            KIND_BIRTHDAY => Ok(EventKind::Birthday),
            _ => Err(format!("Invalid event kind: {s}")),
        }
    }
}

/// The authenticated user's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ResponseStatus {
    /// Not answered yet.
    #[serde(rename = "needsAction")]
    NeedsAction,

    /// Declined.
    #[serde(rename = "declined")]
    Declined,

    /// Tentatively accepted.
    #[serde(rename = "tentative")]
    Tentative,

    /// Accepted.
    #[serde(rename = "accepted")]
    Accepted,

    /// Sentinel for an event removed upstream.
    #[serde(rename = "cancelled")]
    Cancelled,
}

const STATUS_NEEDS_ACTION: &str = "needsAction";
const STATUS_DECLINED: &str = "declined";
const STATUS_TENTATIVE: &str = "tentative";
const STATUS_ACCEPTED: &str = "accepted";
const STATUS_CANCELLED: &str = "cancelled";

impl AsRef<str> for ResponseStatus {
    fn as_ref(&self) -> &str {
        match self {
            ResponseStatus::NeedsAction => STATUS_NEEDS_ACTION,
            ResponseStatus::Declined => STATUS_DECLINED,
            ResponseStatus::Tentative => STATUS_TENTATIVE,
            ResponseStatus::Accepted => STATUS_ACCEPTED,
            ResponseStatus::Cancelled => STATUS_CANCELLED,
        }
    }
}

impl Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for ResponseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_NEEDS_ACTION => Ok(ResponseStatus::NeedsAction),
            STATUS_DECLINED => Ok(ResponseStatus::Declined),
            STATUS_TENTATIVE => Ok(ResponseStatus::Tentative),
            STATUS_ACCEPTED => Ok(ResponseStatus::Accepted),
            STATUS_CANCELLED => Ok(ResponseStatus::Cancelled),
            _ => Err(format!("Invalid response status: {s}")),
        }
    }
}
