// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, fmt::Write, sync::Arc};

use clap::{ArgAction, ArgMatches, Command, arg};
use colored::Colorize;
use jiff::civil::Date;
use synccal_core::{
    EventFilter, Providers, SyncError, SyncReport, SyncRequest, Syncer, cancellation,
};
use synccal_google::GoogleProvider;

use crate::arg::{FilterArgs, parse_date};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct CmdSync {
    pub calendar_ids: Vec<String>,
    pub force: bool,
    pub force_from: Option<Date>,
    pub filter: EventFilter,
}

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Mirror source calendars into their destination calendars")
            .arg(arg!(--force "Purge the destinations and list every source from scratch"))
            .arg(
                arg!(--"force-from" <DATE> "First day of a forced or first sync, as YYYY-MM-DD")
                    .value_parser(parse_date),
            )
            .arg(
                arg!(--"calendar-id" <ID> "Only sync this destination calendar, repeatable")
                    .action(ArgAction::Append),
            )
            .args(FilterArgs::args())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            calendar_ids: matches
                .get_many::<String>("calendar-id")
                .map(|ids| ids.cloned().collect())
                .unwrap_or_default(),
            force: matches.get_flag("force"),
            force_from: matches.get_one::<Date>("force-from").copied(),
            filter: FilterArgs::get_filter(matches),
        }
    }

    pub async fn run(self, session: &Session) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "syncing calendars...");
        let config = &session.config;
        let google = GoogleProvider::new(config.google.clone())?;
        let syncer = Syncer::new(
            Arc::new(session.db.clone()),
            Providers::new().with(Arc::new(google)),
        )
        .with_filter(config.core.filter.union(self.filter))
        .with_options(config.core.sync_options());

        let request = SyncRequest {
            calendar_ids: self.calendar_ids,
            force: self.force,
            force_from: self.force_from,
        };

        let (handle, cancel) = cancellation();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, stopping before the next event");
                handle.cancel();
            }
        });
        let result = syncer.sync(&request, &cancel).await;
        interrupt.abort();

        match result {
            Ok(report) => {
                print!("{}", format_report(&report));
                Ok(())
            }
            Err(SyncError::Incomplete(report)) => {
                print!("{}", format_report(&report));
                Err(SyncError::Incomplete(report).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn format_report(report: &SyncReport) -> String {
    let mut out = String::new();
    if report.destinations.is_empty() {
        let _ = writeln!(out, "{}", "No destination calendars linked".italic());
        return out;
    }

    for destination in &report.destinations {
        let _ = writeln!(out, "{}", destination.calendar_id.bold());
        if let Some(err) = &destination.error {
            let _ = writeln!(out, "  {} {}", "Error:".red(), err);
        }
        if destination.purged > 0 || destination.purge_failed > 0 {
            let _ = writeln!(
                out,
                "  purged {} events, {} failed",
                destination.purged, destination.purge_failed
            );
        }

        for source in &destination.sources {
            let counts = source.counts;
            let _ = write!(
                out,
                "  {} ({}): {} created, {} updated, {} deleted, {} skipped",
                source.calendar_id.cyan(),
                source.mode,
                counts.created,
                counts.updated,
                counts.deleted,
                counts.skipped,
            );
            if counts.failed > 0 {
                let _ = write!(out, ", {}", format!("{} failed", counts.failed).red());
            }
            let _ = writeln!(out);
            if let Some(err) = &source.error {
                let _ = writeln!(out, "    {} {}", "Error:".red(), err);
            }
        }
    }

    let totals = report.totals();
    let _ = writeln!(
        out,
        "{} {} created, {} updated, {} deleted",
        "Total:".green(),
        totals.created,
        totals.updated,
        totals.deleted
    );
    out
}
