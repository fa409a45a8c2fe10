// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account-abstraction client: deterministic (counterfactual) Safe addresses.
//!
//! A Safe deployed through the proxy factory lands at a CREATE2 address that
//! is fully determined by the factory, the proxy init code (with the singleton
//! appended), and a salt derived from the setup calldata and a nonce. That
//! lets the session select an address for an owner with no deployed Safe yet.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{keccak256, Address, B256, U256};
use async_trait::async_trait;
use tracing::debug;

use super::{ClientError, ProtocolClient, ProtocolClientFactory};
use crate::blockchain::ChainClient;

/// Safe proxy factory (v1.3.0) deployed at the same address on all supported
/// chains.
const SAFE_PROXY_FACTORY: &str = "0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2";

/// keccak256 of the proxy creation code with the L2 singleton address
/// appended as its constructor argument.
const PROXY_INIT_CODE_HASH: B256 = B256::new([
    0x56, 0xe3, 0x08, 0x1a, 0x3d, 0x1b, 0xb3, 0x8e, 0xd4, 0xee, 0xd1, 0xa3, 0x9f, 0x77, 0x29,
    0xc3, 0xcc, 0x77, 0xc7, 0x82, 0x5b, 0xd5, 0xba, 0x54, 0xc1, 0x76, 0xd8, 0xb5, 0xcd, 0xbb,
    0x25, 0x33,
]);

/// Function selector of `setup(...)` on the singleton.
const SETUP_SELECTOR: [u8; 4] = [0xb6, 0x3e, 0x80, 0x0d];

/// Protocol client for one owner on one provider.
pub struct SafeProtocolClient {
    owner: Address,
    salt_nonce: U256,
}

impl SafeProtocolClient {
    fn counterfactual_address(&self) -> Address {
        let factory = Address::from_str(SAFE_PROXY_FACTORY).expect("valid factory address");

        // setup calldata for a 1-of-1 Safe owned by the EOA
        let mut initializer = Vec::with_capacity(4 + 32);
        initializer.extend_from_slice(&SETUP_SELECTOR);
        initializer.extend_from_slice(B256::left_padding_from(self.owner.as_slice()).as_slice());

        // salt = keccak256(keccak256(initializer) ++ saltNonce)
        let mut salt_input = Vec::with_capacity(32 + 32);
        salt_input.extend_from_slice(keccak256(&initializer).as_slice());
        salt_input.extend_from_slice(&self.salt_nonce.to_be_bytes::<32>());
        let salt = keccak256(&salt_input);

        factory.create2(salt, PROXY_INIT_CODE_HASH)
    }
}

#[async_trait]
impl ProtocolClient for SafeProtocolClient {
    async fn get_address(&self) -> Result<String, ClientError> {
        let address = self.counterfactual_address();
        debug!(owner = %self.owner, address = %address, "Computed counterfactual Safe address");
        Ok(address.to_checksum(None))
    }
}

/// Factory building protocol clients once the session has an owner and a
/// provider. The factory itself carries no state; the salt nonce is fixed so
/// the derived address is stable across sessions.
pub struct SafeProtocolFactory {
    salt_nonce: U256,
}

impl SafeProtocolFactory {
    pub fn new() -> Self {
        Self {
            salt_nonce: U256::ZERO,
        }
    }
}

impl Default for SafeProtocolFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolClientFactory for SafeProtocolFactory {
    async fn build(
        &self,
        owner_eoa: &str,
        _provider: Arc<ChainClient>,
    ) -> Result<Arc<dyn ProtocolClient>, ClientError> {
        let owner = Address::from_str(owner_eoa)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid owner address: {e}")))?;

        Ok(Arc::new(SafeProtocolClient {
            owner,
            salt_nonce: self.salt_nonce,
        }))
    }
}
