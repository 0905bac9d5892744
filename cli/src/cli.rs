// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf, process::ExitCode};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use futures::{FutureExt, future::BoxFuture};
use synccal_core::APP_NAME;
use tracing_subscriber::EnvFilter;

use crate::arg::CommonArgs;
use crate::cmd_account::CmdAccountAdd;
use crate::cmd_calendars::CmdCalendars;
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::cmd_link::CmdLink;
use crate::cmd_sync::CmdSync;
use crate::config::parse_config;
use crate::session::Session;

const SYNCCAL_LOG_ENV: &str = "SYNCCAL_LOG";

/// Run the synccal command-line interface.
pub async fn run() -> ExitCode {
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.verbose);
    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, filtered by `$SYNCCAL_LOG` or else by the verbosity.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_env(SYNCCAL_LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// How many times `-v` was given
    pub verbose: u8,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Mirror events from source calendars into one destination calendar.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $SYNCCAL_CONFIG, then to \
$XDG_CONFIG_HOME/synccal/config.toml on Linux and MacOS, %LOCALAPPDATA%/synccal/config.toml on \
Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .arg(CommonArgs::verbose())
            .subcommand(CmdSync::command())
            .subcommand(
                Command::new("account")
                    .about("Manage the accounts calendars belong to")
                    .arg_required_else_help(true)
                    .subcommand_required(true)
                    .subcommand(CmdAccountAdd::command()),
            )
            .subcommand(CmdLink::command())
            .subcommand(CmdCalendars::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdSync::NAME, matches)) => Sync(CmdSync::from(matches)),
            Some(("account", matches)) => match matches.subcommand() {
                Some((CmdAccountAdd::NAME, matches)) => AccountAdd(CmdAccountAdd::from(matches)),
                _ => return Err("Unknown account command".into()),
            },
            Some((CmdLink::NAME, matches)) => Link(CmdLink::from(matches)),
            Some((CmdCalendars::NAME, matches)) => Calendars(CmdCalendars::from(matches)),
            Some((CmdGenerateCompletion::NAME, matches)) => {
                GenerateCompletion(CmdGenerateCompletion::from(matches))
            }
            _ => return Err("No command given".into()),
        };

        let config = matches.get_one("config").cloned();
        let verbose = CommonArgs::get_verbose(&matches);
        Ok(Cli {
            config,
            verbose,
            command,
        })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Mirror source calendars into their destinations
    Sync(CmdSync),

    /// Register an account
    AccountAdd(CmdAccountAdd),

    /// Link a source calendar to a destination calendar
    Link(CmdLink),

    /// List calendars
    Calendars(CmdCalendars),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Sync(a)       => Self::run_with(config, |x| a.run(x).boxed()).await,
            AccountAdd(a) => Self::run_with(config, |x| a.run(x).boxed()).await,
            Link(a)       => Self::run_with(config, |x| a.run(x).boxed()).await,
            Calendars(a)  => Self::run_with(config, |x| a.run(x).boxed()).await,
            GenerateCompletion(a) => a.run(),
        }
    }

    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a Session) -> BoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let config = parse_config(config).await?;
        let session = Session::open(config).await?;

        let result = f(&session).await;

        session.close().await?;
        result
    }
}
