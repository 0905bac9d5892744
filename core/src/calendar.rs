// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display};
use std::str::FromStr;

/// A supported calendar provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Google Calendar.
    Google,
}

const PLATFORM_GOOGLE: &str = "google";

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 1] = [Platform::Google];
}

impl AsRef<str> for Platform {
    fn as_ref(&self) -> &str {
        match self {
            Platform::Google => PLATFORM_GOOGLE,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            PLATFORM_GOOGLE => Ok(Platform::Google),
            _ => Err(format!("Unsupported platform: {s}")),
        }
    }
}

/// An authenticated identity on a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// The provider hosting the account.
    pub platform: Platform,

    /// User-chosen name, unique per platform.
    pub name: String,

    /// Opaque credential blob understood by the provider.
    pub auth: String,
}

impl Account {
    /// Returns the local identifier `"{platform}/{name}"`.
    pub fn id(&self) -> String {
        account_id(self.platform, &self.name)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("platform", &self.platform)
            .field("name", &self.name)
            .field("auth", &"<redacted>")
            .finish()
    }
}

/// Builds the local identifier of an account.
pub fn account_id(platform: Platform, name: &str) -> String {
    format!("{platform}/{name}")
}

/// Builds the local identifier of a calendar.
pub fn calendar_id(account_id: &str, name: &str) -> String {
    format!("{account_id}/{name}")
}

/// Whether a calendar receives events or feeds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarRole {
    /// Receives mirrored events.
    Destination,

    /// Feeds events into one destination.
    Source {
        /// Local id of the destination calendar.
        destination_id: String,

        /// Text prepended to every mirrored title.
        prefix: String,
    },
}

/// A calendar known to the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// Local identifier, `"{account_id}/{name}"`.
    pub id: String,

    /// User-chosen name.
    pub name: String,

    /// The calendar id on the provider side, e.g. `primary`.
    pub provider_id: String,

    /// The account owning the calendar.
    pub account: Account,

    /// The role of the calendar in the sync topology.
    pub role: CalendarRole,

    /// Incremental sync cursor. Empty means never synced.
    pub cursor: String,
}

impl Calendar {
    /// The prefix for mirrored titles, empty for destinations.
    pub fn prefix(&self) -> &str {
        match &self.role {
            CalendarRole::Source { prefix, .. } => prefix,
            CalendarRole::Destination => "",
        }
    }

    /// Returns whether the calendar has completed at least one pass.
    pub fn has_cursor(&self) -> bool {
        !self.cursor.is_empty()
    }
}

/// One mirrored event: which source event a destination event stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMapping {
    /// Local id of the destination calendar.
    pub destination_calendar_id: String,

    /// Event id in the destination calendar.
    pub destination_event_id: String,

    /// Local id of the source calendar.
    pub source_calendar_id: String,

    /// Event id in the source calendar.
    pub source_event_id: String,
}
