// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet-auth client backed by the Safe transaction service.
//!
//! The social sign-in itself happens with the external wallet provider; what
//! this service consumes is its outcome: the owner EOA, the Safes owned by
//! that EOA, and a live provider handle on the active chain. The owned-Safe
//! list comes from the transaction service
//! (`GET /api/v1/owners/{address}/safes/`).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use super::{AuthClient, AuthClientFactory, ClientError, SignInResult};
use crate::blockchain::{Chain, ChainClient};
use crate::config::{env_or_default, env_required, OWNER_EOA_ENV, TX_SERVICE_URL_ENV};

const DEFAULT_TX_SERVICE_URL: &str = "https://safe-transaction-mainnet.safe.global";

#[derive(Debug, Deserialize)]
struct OwnedSafesResponse {
    safes: Vec<String>,
}

/// Auth client bound to one chain.
pub struct SafeAuthClient {
    chain: &'static Chain,
    tx_service_url: String,
    owner_eoa: String,
    http: Client,
    /// Present after a successful sign-in, dropped on sign-out.
    provider: RwLock<Option<Arc<ChainClient>>>,
}

#[async_trait]
impl AuthClient for SafeAuthClient {
    async fn sign_in(&self) -> Result<SignInResult, ClientError> {
        let url = format!(
            "{}/api/v1/owners/{}/safes/",
            self.tx_service_url, self.owner_eoa
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Auth(format!(
                "transaction service returned {}",
                response.status()
            )));
        }

        let owned: OwnedSafesResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let client = ChainClient::new(self.chain)
            .map_err(|e| ClientError::Request(e.to_string()))?;
        *self.provider.write().await = Some(Arc::new(client));

        info!(
            chain = self.chain.id,
            owner = %self.owner_eoa,
            safes = owned.safes.len(),
            "Wallet auth sign-in completed"
        );

        Ok(SignInResult {
            eoa: self.owner_eoa.clone(),
            safes: owned.safes,
        })
    }

    fn provider(&self) -> Option<Arc<ChainClient>> {
        self.provider.try_read().ok().and_then(|p| p.clone())
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        self.provider.write().await.take();
        Ok(())
    }
}

/// Factory that builds a [`SafeAuthClient`] per chain from the environment.
pub struct SafeAuthFactory {
    tx_service_url: String,
    owner_eoa: String,
    http: Client,
}

impl SafeAuthFactory {
    pub fn from_env() -> Result<Self, ClientError> {
        let tx_service_url = env_or_default(TX_SERVICE_URL_ENV, DEFAULT_TX_SERVICE_URL);
        let owner_eoa = env_required(OWNER_EOA_ENV).map_err(ClientError::MissingConfig)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ClientError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            tx_service_url,
            owner_eoa,
            http,
        })
    }

    /// Construct directly, for callers that already hold the configuration.
    pub fn new(tx_service_url: impl Into<String>, owner_eoa: impl Into<String>) -> Self {
        Self {
            tx_service_url: tx_service_url.into().trim_end_matches('/').to_string(),
            owner_eoa: owner_eoa.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl AuthClientFactory for SafeAuthFactory {
    async fn build(&self, chain: &'static Chain) -> Result<Arc<dyn AuthClient>, ClientError> {
        info!(chain = chain.id, rpc = chain.rpc_url, "Initializing wallet auth client");

        Ok(Arc::new(SafeAuthClient {
            chain,
            tx_service_url: self.tx_service_url.trim_end_matches('/').to_string(),
            owner_eoa: self.owner_eoa.clone(),
            http: self.http.clone(),
            provider: RwLock::new(None),
        }))
    }
}
