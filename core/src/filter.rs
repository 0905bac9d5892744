// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::event::{Event, EventKind, ResponseStatus};

const CLOCKWISE_MARKER: &str = "❇️";
const CLOCKWISE_FOCUS_TIME: &str = "focus time (via clockwise)";
const CLOCKWISE_LUNCH: &str = "lunch (via clockwise)";

/// Rules deciding which source events are kept out of the destination calendar.
///
/// Every enabled rule is OR-combined: an event matching any of them is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct EventFilter {
    /// Ignore events the user declined.
    pub ignore_declined_events: bool,

    /// Ignore events the user created without inviting anyone.
    pub ignore_my_events_alone: bool,

    /// Ignore out-of-office blocks.
    pub ignore_out_of_office: bool,

    /// Ignore focus-time blocks.
    pub ignore_focus_time: bool,

    /// Mirror the focus-time blocks Clockwise creates.
    pub sync_clockwise_focus_time: bool,

    /// Mirror the lunch blocks Clockwise creates.
    pub sync_clockwise_lunch: bool,
}

impl EventFilter {
    /// Combines two filters, enabling every rule enabled in either.
    #[must_use]
    pub fn union(self, other: EventFilter) -> Self {
        Self {
            ignore_declined_events: self.ignore_declined_events || other.ignore_declined_events,
            ignore_my_events_alone: self.ignore_my_events_alone || other.ignore_my_events_alone,
            ignore_out_of_office: self.ignore_out_of_office || other.ignore_out_of_office,
            ignore_focus_time: self.ignore_focus_time || other.ignore_focus_time,
            sync_clockwise_focus_time: self.sync_clockwise_focus_time
                || other.sync_clockwise_focus_time,
            sync_clockwise_lunch: self.sync_clockwise_lunch || other.sync_clockwise_lunch,
        }
    }

    /// Returns whether the event must not be mirrored. Cancelled events are never ignored.
    pub fn should_ignore(&self, event: &Event) -> bool {
        if event.is_cancelled() {
            return false;
        }

        if self.ignore_declined_events && event.response_status == Some(ResponseStatus::Declined)
        {
            return true;
        }

        if self.ignore_my_events_alone && event.created_by_me && event.attendees == 0 {
            return true;
        }

        if self.ignore_out_of_office && event.kind == EventKind::OutOfOffice {
            return true;
        }

        if self.ignore_focus_time && event.kind == EventKind::FocusTime {
            return true;
        }

        let summary = normalize_clockwise_summary(&event.summary);
        if !self.sync_clockwise_focus_time && summary == CLOCKWISE_FOCUS_TIME {
            return true;
        }

        if !self.sync_clockwise_lunch && summary == CLOCKWISE_LUNCH {
            return true;
        }

        false
    }
}

/// Strips Clockwise's sparkle marker and lowercases the rest.
fn normalize_clockwise_summary(summary: &str) -> String {
    summary
        .trim()
        .trim_start_matches(CLOCKWISE_MARKER)
        .trim_start_matches('\u{2747}') // the marker without its variation selector
        .trim()
        .to_lowercase()
}
