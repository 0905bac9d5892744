// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tests for the sync engine.
//!
//! These tests drive [`synccal_core::Syncer`] through full passes and check the calls it
//! makes against the provider and the store.

mod cursor;
mod decisions;
mod end_to_end;
mod failures;
