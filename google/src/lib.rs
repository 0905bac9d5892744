// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Google Calendar provider for synccal, built on the Calendar v3 REST API.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::single_match_else
)]

mod auth;
mod client;
mod config;
mod convert;
mod error;
mod http;
mod provider;
mod types;

pub use crate::auth::Token;
pub use crate::client::{GoogleClient, ListQuery};
pub use crate::config::GoogleConfig;
pub use crate::error::GoogleError;
pub use crate::provider::GoogleProvider;
pub use crate::types::{ApiEvent, Attendee, EventDateTime, EventList, Person, Reminders};
