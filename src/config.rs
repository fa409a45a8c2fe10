// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the local key store | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `INITIAL_CHAIN_ID` | Chain selected at startup | `0x5` |
//! | `STARTUP_URL` | URL the service was launched from (OAuth redirect detection) | Optional |
//! | `POLL_INTERVAL_SECS` | Balance poll interval in seconds | `15` |
//! | `TX_SERVICE_URL` | Safe transaction service base URL | mainnet service |
//! | `GELATO_RELAY_URL` | Gelato relay API base URL | `https://api.gelato.digital` |
//! | `STRIPE_PUBLIC_KEY` | Stripe publishable key for the on-ramp widget | Required for Stripe |
//! | `STRIPE_ONRAMP_BACKEND_URL` | Backend that mints Stripe on-ramp sessions | Required for Stripe |
//! | `MONERIUM_CLIENT_ID` | Monerium OAuth client id | Required for Monerium |
//! | `MONERIUM_ENVIRONMENT` | Monerium environment (`sandbox` or `production`) | `sandbox` |
//! | `MONERIUM_REDIRECT_URL` | OAuth redirect URL registered with Monerium | Required for Monerium |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the local store directory path.
///
/// The coarse authentication flag, the Monerium refresh token, and the
/// selected-safe preference are persisted here.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the chain selected at startup.
pub const INITIAL_CHAIN_ID_ENV: &str = "INITIAL_CHAIN_ID";

/// Environment variable name for the URL the service was launched from.
///
/// When this URL carries an OAuth `code` query parameter the startup chain is
/// forced to the auth redirect chain regardless of `INITIAL_CHAIN_ID`.
pub const STARTUP_URL_ENV: &str = "STARTUP_URL";

/// Environment variable name for the balance poll interval, in seconds.
pub const POLL_INTERVAL_SECS_ENV: &str = "POLL_INTERVAL_SECS";

/// Environment variable name for the Safe transaction service base URL.
pub const TX_SERVICE_URL_ENV: &str = "TX_SERVICE_URL";

/// Environment variable name for the owner EOA handed back by the social
/// sign-in provider. The provider itself is an external collaborator; the
/// service only consumes its result.
pub const OWNER_EOA_ENV: &str = "OWNER_EOA";

/// Environment variable name for the Gelato relay base URL.
pub const GELATO_RELAY_URL_ENV: &str = "GELATO_RELAY_URL";

/// Environment variable names for the Stripe on-ramp configuration.
pub const STRIPE_PUBLIC_KEY_ENV: &str = "STRIPE_PUBLIC_KEY";
pub const STRIPE_ONRAMP_BACKEND_URL_ENV: &str = "STRIPE_ONRAMP_BACKEND_URL";

/// Environment variable names for the Monerium on/off-ramp configuration.
pub const MONERIUM_CLIENT_ID_ENV: &str = "MONERIUM_CLIENT_ID";
pub const MONERIUM_ENVIRONMENT_ENV: &str = "MONERIUM_ENVIRONMENT";
pub const MONERIUM_REDIRECT_URL_ENV: &str = "MONERIUM_REDIRECT_URL";

/// Read an environment variable, falling back to a default.
pub(crate) fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Read a required environment variable.
pub(crate) fn env_required(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("missing required environment variable {name}"))
}
