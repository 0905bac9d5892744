// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use clap::{Arg, ArgAction, ArgMatches, arg};
use jiff::civil::Date;
use synccal_core::{EventFilter, Platform};

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn verbose() -> Arg {
        arg!(-v --verbose "Show more log output, repeat for even more")
            .action(ArgAction::Count)
            .global(true)
    }

    pub fn get_verbose(matches: &ArgMatches) -> u8 {
        matches.get_count("verbose")
    }

    pub fn platform() -> Arg {
        arg!(--platform <PLATFORM> "The platform hosting the account")
            .value_parser(parse_platform)
            .default_value("google")
    }

    pub fn get_platform(matches: &ArgMatches) -> Platform {
        matches
            .get_one("platform")
            .copied()
            .unwrap_or(Platform::Google)
    }

    pub fn get_string(matches: &ArgMatches, id: &str) -> String {
        matches.get_one::<String>(id).cloned().unwrap_or_default()
    }
}

/// Flags enabling the rules of the event filter, on top of the configured ones.
#[derive(Debug, Clone, Copy)]
pub struct FilterArgs;

impl FilterArgs {
    const DECLINED: &str = "ignore-declined-events";
    const ALONE: &str = "ignore-my-events-alone";
    const OUT_OF_OFFICE: &str = "ignore-out-of-office";
    const FOCUS_TIME: &str = "ignore-focus-time";
    const CLOCKWISE_FOCUS_TIME: &str = "clockwise-sync-focus-time";
    const CLOCKWISE_LUNCH: &str = "clockwise-sync-lunch";

    pub fn args() -> [Arg; 6] {
        [
            Self::flag(Self::DECLINED, "Do not mirror events you declined"),
            Self::flag(Self::ALONE, "Do not mirror events you created without guests"),
            Self::flag(Self::OUT_OF_OFFICE, "Do not mirror out-of-office blocks"),
            Self::flag(Self::FOCUS_TIME, "Do not mirror focus-time blocks"),
            Self::flag(
                Self::CLOCKWISE_FOCUS_TIME,
                "Mirror focus-time blocks created by Clockwise",
            ),
            Self::flag(Self::CLOCKWISE_LUNCH, "Mirror lunch blocks created by Clockwise"),
        ]
    }

    pub fn get_filter(matches: &ArgMatches) -> EventFilter {
        EventFilter {
            ignore_declined_events: matches.get_flag(Self::DECLINED),
            ignore_my_events_alone: matches.get_flag(Self::ALONE),
            ignore_out_of_office: matches.get_flag(Self::OUT_OF_OFFICE),
            ignore_focus_time: matches.get_flag(Self::FOCUS_TIME),
            sync_clockwise_focus_time: matches.get_flag(Self::CLOCKWISE_FOCUS_TIME),
            sync_clockwise_lunch: matches.get_flag(Self::CLOCKWISE_LUNCH),
        }
    }

    fn flag(id: &'static str, help: &'static str) -> Arg {
        Arg::new(id).long(id).help(help).action(ArgAction::SetTrue)
    }
}

pub fn parse_date(s: &str) -> Result<Date, String> {
    s.parse::<Date>()
        .map_err(|e| format!("expected a date as YYYY-MM-DD: {e}"))
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
}
