// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, value_parser};
use colored::Colorize;
use synccal_core::Platform;
use synccal_google::Token;
use tokio::fs;

use crate::arg::CommonArgs;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct CmdAccountAdd {
    pub platform: Platform,
    pub name: String,
    pub auth_file: PathBuf,
}

impl CmdAccountAdd {
    pub const NAME: &str = "add";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Register an account, or replace the credentials of an existing one")
            .arg(CommonArgs::platform())
            .arg(arg!(--name <NAME> "Name of the account, unique per platform").required(true))
            .arg(
                arg!(--"auth-file" <PATH> "File holding the credentials, e.g. an OAuth token")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            platform: CommonArgs::get_platform(matches),
            name: CommonArgs::get_string(matches, "name"),
            auth_file: matches
                .get_one::<PathBuf>("auth-file")
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub async fn run(self, session: &Session) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "adding account...");
        if self.name.is_empty() || self.name.contains('/') {
            return Err(format!("Invalid account name: {:?}", self.name).into());
        }

        let auth = fs::read_to_string(&self.auth_file).await.map_err(|e| {
            format!(
                "Failed to read credentials at {}: {}",
                self.auth_file.display(),
                e
            )
        })?;
        let auth = auth.trim();
        validate_auth(self.platform, auth)?;

        let account = session.db.add_account(self.platform, &self.name, auth).await?;
        println!("{} account {}", "Saved".green(), account.id().bold());
        Ok(())
    }
}

fn validate_auth(platform: Platform, auth: &str) -> Result<(), Box<dyn Error>> {
    match platform {
        Platform::Google => {
            Token::parse(auth)?;
        }
    }
    Ok(())
}
