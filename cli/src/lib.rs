// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end of synccal.

mod arg;
mod cli;
mod cmd_account;
mod cmd_calendars;
mod cmd_generate_completion;
mod cmd_link;
mod cmd_sync;
mod config;
mod session;
mod table;

pub use crate::cli::{Cli, Commands, run};
pub use crate::config::{Config, parse_config};
