// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain registry and read-only chain access for the selected Safe.

pub mod client;
pub mod erc20;
pub mod types;

pub use client::{ChainClient, ChainClientError};
pub use erc20::Erc20Contract;
pub use types::{
    get_chain, initial_chain, Chain, Erc20TokenInfo, TokenBalance, AUTH_REDIRECT_CHAIN_ID, CHAINS,
};
