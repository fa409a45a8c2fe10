// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Local Persisted State
//!
//! Small embedded key/value store standing in for the browser's local
//! storage. Keys are process-wide state with an explicit lifecycle: set on
//! success, cleared on logout or flow close, read once at the relevant
//! initialization points.
//!
//! All writes go through the session manager, so the store needs no locking
//! beyond redb's own transactions.

pub mod local_store;

pub use local_store::{LocalStore, LocalStoreError};

/// Coarse authentication flag ("true" or absent). Rehydrated at startup so
/// the route guard can answer before the auth client finishes initializing.
pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";

/// Monerium refresh token persisted after a successful flow open.
pub const MONERIUM_TOKEN_KEY: &str = "monerium_token";

/// Safe address the Monerium flow was started for; doubles as the stored
/// safe-selection preference.
pub const MONERIUM_SELECTED_SAFE_KEY: &str = "monerium_safe_selected";
