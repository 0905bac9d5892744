// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use colored::Colorize;
use synccal_core::CalendarLink;

use crate::arg::CommonArgs;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct CmdLink {
    pub link: CalendarLink,
}

impl CmdLink {
    pub const NAME: &str = "link";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Mirror a source calendar into a destination calendar")
            .arg(arg!(--name <NAME> "Local name of the source calendar").required(true))
            .arg(
                arg!(--source <ACCOUNT> "Account owning the source calendar, as PLATFORM/NAME")
                    .required(true),
            )
            .arg(
                arg!(--"source-calendar" <ID> "Provider id of the source calendar")
                    .default_value("primary"),
            )
            .arg(
                arg!(--destination <ACCOUNT> "Account owning the destination calendar")
                    .required(true),
            )
            .arg(
                arg!(--"destination-calendar" <ID> "Provider id of the destination calendar")
                    .required(true),
            )
            .arg(arg!(--prefix <PREFIX> "Text prepended to every mirrored title"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            link: CalendarLink {
                name: CommonArgs::get_string(matches, "name"),
                source_account_id: CommonArgs::get_string(matches, "source"),
                source_calendar_id: CommonArgs::get_string(matches, "source-calendar"),
                destination_account_id: CommonArgs::get_string(matches, "destination"),
                destination_calendar_id: CommonArgs::get_string(matches, "destination-calendar"),
                prefix: CommonArgs::get_string(matches, "prefix"),
            },
        }
    }

    pub async fn run(self, session: &Session) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "linking calendars...");
        let calendar = session.db.link_calendar(&self.link).await?;
        println!(
            "{} {} -> {}",
            "Linked".green(),
            calendar.id.bold(),
            format!(
                "{}/{}",
                self.link.destination_account_id, self.link.destination_calendar_id
            )
            .bold()
        );
        Ok(())
    }
}
