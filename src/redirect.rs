// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OAuth redirect detection.
//!
//! A `code` query parameter on the startup (or callback) URL means the
//! process was reached through an OAuth-style provider redirect rather than a
//! fresh load. Detection must run before normal initial-chain selection: a
//! redirect forces the designated auth redirect chain so the in-flight flow
//! resumes on the chain it was started on.

use url::Url;

use crate::blockchain::{initial_chain, AUTH_REDIRECT_CHAIN_ID};

/// Extract the OAuth `code` query parameter, if present.
pub fn auth_code(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

/// Whether the URL is an OAuth redirect callback.
pub fn is_auth_redirect(url: &str) -> bool {
    auth_code(url).is_some()
}

/// Chain id to select at startup for the given launch URL.
///
/// `None` (no URL known) behaves like a fresh load.
pub fn initial_chain_id(url: Option<&str>) -> &'static str {
    match url {
        Some(url) if is_auth_redirect(url) => AUTH_REDIRECT_CHAIN_ID,
        _ => initial_chain().id,
    }
}
