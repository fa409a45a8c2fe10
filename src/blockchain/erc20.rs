// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use std::str::FromStr;

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::{format_balance, ChainClientError};
use super::types::Erc20TokenInfo;

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
    address: Address,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Create a new ERC-20 contract instance.
    pub fn new(provider: &P, contract_address: &str) -> Result<Self, ChainClientError> {
        let address = Address::from_str(contract_address)
            .map_err(|e| ChainClientError::InvalidAddress(e.to_string()))?;

        let contract = IERC20::new(address, provider.clone());

        Ok(Self { contract, address })
    }

    /// Get the token name.
    pub async fn name(&self) -> Result<String, ChainClientError> {
        let result = self
            .contract
            .name()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;
        Ok(result.to_string())
    }

    /// Get the token symbol.
    pub async fn symbol(&self) -> Result<String, ChainClientError> {
        let result = self
            .contract
            .symbol()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;
        Ok(result.to_string())
    }

    /// Get the token decimals.
    pub async fn decimals(&self) -> Result<u8, ChainClientError> {
        let result = self
            .contract
            .decimals()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;
        Ok(result)
    }

    /// Get metadata and the balance of a holder, assembled into the record
    /// the balance poller keys by token address.
    pub async fn token_info(&self, holder_address: &str) -> Result<Erc20TokenInfo, ChainClientError> {
        let holder = Address::from_str(holder_address)
            .map_err(|e| ChainClientError::InvalidAddress(e.to_string()))?;

        // Metadata failures fall back to placeholders; the balance is the
        // load-bearing value.
        let name: String = self.name().await.unwrap_or_else(|_| "Unknown".to_string());
        let symbol: String = self.symbol().await.unwrap_or_else(|_| "???".to_string());
        let decimals: u8 = self.decimals().await.unwrap_or(18);

        let balance: U256 = self
            .contract
            .balanceOf(holder)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;

        Ok(Erc20TokenInfo {
            address: format!("{:?}", self.address),
            name,
            symbol,
            decimals,
            balance_raw: balance.to_string(),
            balance_formatted: format_balance(balance, decimals),
        })
    }
}
