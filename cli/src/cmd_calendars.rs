// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::{Color, Colorize};
use synccal_core::{Calendar, CalendarRole};

use crate::session::Session;
use crate::table::{Column, Table};

#[derive(Debug, Clone, Copy)]
pub struct CmdCalendars;

impl CmdCalendars {
    pub const NAME: &str = "calendars";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List destination calendars and the sources feeding them")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        Self
    }

    pub async fn run(self, session: &Session) -> Result<(), Box<dyn Error>> {
        tracing::debug!("listing calendars...");
        let calendars = session.db.calendars().await?;
        let destinations: Vec<_> = calendars
            .iter()
            .filter(|c| c.role == CalendarRole::Destination)
            .collect();
        if destinations.is_empty() {
            println!("{}", "No calendars linked".italic());
            return Ok(());
        }

        for destination in destinations {
            let mirrored = session.db.count_mappings(&destination.id).await?;
            println!(
                "{} ({} mirrored events)",
                destination.id.bold(),
                mirrored
            );

            let sources: Vec<Calendar> = calendars
                .iter()
                .filter(|c| feeds(c, &destination.id))
                .cloned()
                .collect();
            if sources.is_empty() {
                println!("  {}", "no sources".italic());
                continue;
            }

            let table = Table::new(SourceColumn::ALL.to_vec(), &sources);
            for line in table.render().lines() {
                println!("  {line}");
            }
        }
        Ok(())
    }
}

fn feeds(calendar: &Calendar, destination_id: &str) -> bool {
    matches!(&calendar.role, CalendarRole::Source { destination_id: id, .. } if id == destination_id)
}

#[derive(Debug, Clone, Copy)]
enum SourceColumn {
    Id,
    ProviderId,
    Prefix,
    State,
}

impl SourceColumn {
    const ALL: [SourceColumn; 4] = [
        SourceColumn::Id,
        SourceColumn::ProviderId,
        SourceColumn::Prefix,
        SourceColumn::State,
    ];
}

impl Column<Calendar> for SourceColumn {
    fn header(&self) -> &'static str {
        match self {
            SourceColumn::Id => "SOURCE",
            SourceColumn::ProviderId => "CALENDAR",
            SourceColumn::Prefix => "PREFIX",
            SourceColumn::State => "STATE",
        }
    }

    fn format(&self, data: &Calendar) -> String {
        match self {
            SourceColumn::Id => data.id.clone(),
            SourceColumn::ProviderId => data.provider_id.clone(),
            SourceColumn::Prefix => format!("{:?}", data.prefix()),
            SourceColumn::State if data.has_cursor() => "incremental".to_string(),
            SourceColumn::State => "never synced".to_string(),
        }
    }

    fn color(&self, data: &Calendar) -> Option<Color> {
        match self {
            SourceColumn::Id => Some(Color::Cyan),
            SourceColumn::State if !data.has_cursor() => Some(Color::Yellow),
            _ => None,
        }
    }
}
