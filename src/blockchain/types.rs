// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain registry types and constants.
//!
//! The registry is static configuration: each supported chain carries its hex
//! chain id, RPC endpoint, and the ERC-20 tokens whose balances are polled for
//! the selected Safe. Lookups are pure.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported chain configuration.
#[derive(Debug, Clone)]
pub struct Chain {
    /// Hex chain id as used by wallet providers (e.g. `0x5`)
    pub id: &'static str,
    /// Chain name for display
    pub label: &'static str,
    /// Native currency symbol
    pub native_symbol: &'static str,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// ERC-20 token contracts polled for the selected Safe
    pub supported_erc20_tokens: &'static [&'static str],
    /// Whether the Stripe on-ramp widget is available on this chain
    pub is_stripe_payments_enabled: bool,
    /// Whether the Monerium on/off-ramp flow is available on this chain
    pub is_money_ramp_enabled: bool,
}

/// Ethereum mainnet.
pub const MAINNET: Chain = Chain {
    id: "0x1",
    label: "Ethereum",
    native_symbol: "ETH",
    rpc_url: "https://cloudflare-eth.com",
    explorer_url: "https://etherscan.io",
    supported_erc20_tokens: &[
        // USDC
        "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        // DAI
        "0x6B175474E89094C44Da98b954EedeAC495271d0F",
    ],
    is_stripe_payments_enabled: false,
    is_money_ramp_enabled: false,
};

/// Goerli testnet. Default chain and the chain forced on OAuth redirects.
pub const GOERLI: Chain = Chain {
    id: "0x5",
    label: "Goerli",
    native_symbol: "gETH",
    rpc_url: "https://rpc.ankr.com/eth_goerli",
    explorer_url: "https://goerli.etherscan.io",
    supported_erc20_tokens: &[
        // USDC (Goerli)
        "0x07865c6E87B9F70255377e024ace6630C1Eaa37F",
    ],
    is_stripe_payments_enabled: true,
    is_money_ramp_enabled: true,
};

/// Gnosis Chain.
pub const GNOSIS: Chain = Chain {
    id: "0x64",
    label: "Gnosis Chain",
    native_symbol: "xDai",
    rpc_url: "https://rpc.gnosischain.com",
    explorer_url: "https://gnosisscan.io",
    supported_erc20_tokens: &[],
    is_stripe_payments_enabled: false,
    is_money_ramp_enabled: false,
};

/// Polygon PoS.
pub const POLYGON: Chain = Chain {
    id: "0x89",
    label: "Polygon",
    native_symbol: "MATIC",
    rpc_url: "https://polygon-rpc.com",
    explorer_url: "https://polygonscan.com",
    supported_erc20_tokens: &[
        // USDC (PoS)
        "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174",
    ],
    is_stripe_payments_enabled: false,
    is_money_ramp_enabled: false,
};

/// All chains known to the registry.
pub const CHAINS: &[Chain] = &[MAINNET, GOERLI, GNOSIS, POLYGON];

/// Chain id forced when the startup URL is an OAuth redirect callback.
pub const AUTH_REDIRECT_CHAIN_ID: &str = "0x5";

/// Look up a chain by its hex id.
pub fn get_chain(chain_id: &str) -> Option<&'static Chain> {
    CHAINS.iter().find(|chain| chain.id == chain_id)
}

/// Default chain when no redirect or configuration overrides it.
pub fn initial_chain() -> &'static Chain {
    &GOERLI
}

/// Native token balance of the selected Safe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenBalance {
    /// Token symbol (e.g. "ETH")
    pub symbol: String,
    /// Balance in the smallest unit (wei)
    pub balance_raw: String,
    /// Balance formatted with decimals
    pub balance_formatted: String,
    /// Number of decimals
    pub decimals: u8,
}

/// ERC-20 token metadata and balance for the selected Safe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Erc20TokenInfo {
    /// Token contract address
    pub address: String,
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Number of decimals
    pub decimals: u8,
    /// Balance in the token's smallest unit
    pub balance_raw: String,
    /// Balance formatted with decimals
    pub balance_formatted: String,
}
