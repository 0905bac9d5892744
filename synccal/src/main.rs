// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! synccal - mirror events from source calendars into one destination calendar

use std::process::ExitCode;

use synccal_cli::run;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}
