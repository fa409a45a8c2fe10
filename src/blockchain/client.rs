// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only chain client used as the session's web3 provider handle.

use std::collections::HashMap;
use std::str::FromStr;

use alloy::{
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::erc20::Erc20Contract;
use super::types::{Chain, Erc20TokenInfo, TokenBalance};

/// HTTP provider type (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
>;

/// RPC client bound to one chain from the registry.
///
/// A `ChainClient` is handed out by the auth client on sign-in and acts as the
/// session's provider handle; it is dropped when the session is cleared.
pub struct ChainClient {
    chain: &'static Chain,
    provider: HttpProvider,
}

impl ChainClient {
    /// Create a new client for the given chain.
    pub fn new(chain: &'static Chain) -> Result<Self, ChainClientError> {
        let url: url::Url = chain
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { chain, provider })
    }

    /// The chain this client is bound to.
    pub fn chain(&self) -> &'static Chain {
        self.chain
    }

    /// Get the native balance of an address, in wei.
    pub async fn native_balance_raw(&self, address: &str) -> Result<U256, ChainClientError> {
        let addr = Address::from_str(address)
            .map_err(|e| ChainClientError::InvalidAddress(e.to_string()))?;

        self.provider
            .get_balance(addr)
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    /// Get the native balance of an address with display formatting.
    pub async fn native_balance(&self, address: &str) -> Result<TokenBalance, ChainClientError> {
        let balance = self.native_balance_raw(address).await?;

        Ok(TokenBalance {
            symbol: self.chain.native_symbol.to_string(),
            balance_raw: balance.to_string(),
            balance_formatted: format_balance(balance, 18),
            decimals: 18,
        })
    }

    /// Get metadata and balance for one ERC-20 token.
    pub async fn erc20_token_info(
        &self,
        holder_address: &str,
        token_address: &str,
    ) -> Result<Erc20TokenInfo, ChainClientError> {
        let contract = Erc20Contract::new(&self.provider, token_address)?;
        contract.token_info(holder_address).await
    }

    /// Get balances for the chain's supported ERC-20 tokens, keyed by token
    /// address. Tokens that fail to resolve are skipped with a warning.
    pub async fn erc20_balances(
        &self,
        holder_address: &str,
    ) -> Result<HashMap<String, Erc20TokenInfo>, ChainClientError> {
        let mut balances = HashMap::new();
        for token_addr in self.chain.supported_erc20_tokens {
            match self.erc20_token_info(holder_address, token_addr).await {
                Ok(info) => {
                    balances.insert(info.address.clone(), info);
                }
                Err(e) => {
                    tracing::warn!(token = %token_addr, error = %e, "Failed to get ERC-20 balance");
                }
            }
        }
        Ok(balances)
    }
}

/// Format a balance with the specified number of decimals.
pub(crate) fn format_balance(balance: U256, decimals: u8) -> String {
    if balance.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = balance / divisor;
    let remainder = balance % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        // Format with up to 6 decimal places
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, &trimmed[..trimmed.len().min(6)])
        }
    }
}

/// Errors that can occur during chain access.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::GOERLI;

    #[test]
    fn test_format_balance() {
        // 1 ETH = 1e18 wei
        let one_eth = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_balance(one_eth, 18), "1");

        // 0.01 ETH, the demo relay transfer value
        let demo = U256::from(10_000_000_000_000_000u64);
        assert_eq!(format_balance(demo, 18), "0.01");

        // 1.23456789 ETH (truncated to 6 decimals)
        let complex = U256::from(1_234_567_890_000_000_000u64);
        assert_eq!(format_balance(complex, 18), "1.234567");

        // Zero
        assert_eq!(format_balance(U256::ZERO, 18), "0");

        // 1 USDC = 1e6
        let one_usdc = U256::from(1_000_000u64);
        assert_eq!(format_balance(one_usdc, 6), "1");
    }

    #[test]
    fn client_builds_from_registry_chain() {
        let client = ChainClient::new(&GOERLI).unwrap();
        assert_eq!(client.chain().id, "0x5");
    }
}
