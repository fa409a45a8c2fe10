// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gelato relay client.
//!
//! Submits transactions through the Gelato relay HTTP API and returns the
//! remote task id. Task completion is not polled here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{ClientError, MetaTransactionData, MetaTransactionOptions, RelayClient, RelayResponse};
use crate::blockchain::Chain;
use crate::config::{env_or_default, GELATO_RELAY_URL_ENV};

const DEFAULT_RELAY_BASE_URL: &str = "https://api.gelato.digital";

#[derive(Debug, Deserialize)]
struct RelayTaskResponse {
    #[serde(rename = "taskId")]
    task_id: String,
}

/// HTTP client for the Gelato relay API.
#[derive(Debug, Clone)]
pub struct GelatoRelayClient {
    base_url: String,
    http: Client,
}

impl GelatoRelayClient {
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env_or_default(GELATO_RELAY_URL_ENV, DEFAULT_RELAY_BASE_URL);
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ClientError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn numeric_chain_id(chain: &Chain) -> Result<u64, ClientError> {
        u64::from_str_radix(chain.id.trim_start_matches("0x"), 16)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid chain id {}: {e}", chain.id)))
    }
}

#[async_trait]
impl RelayClient for GelatoRelayClient {
    async fn relay_transaction(
        &self,
        chain: &'static Chain,
        transactions: &[MetaTransactionData],
        options: &MetaTransactionOptions,
    ) -> Result<RelayResponse, ClientError> {
        let tx = transactions
            .first()
            .ok_or_else(|| ClientError::Request("empty transaction list".to_string()))?;

        let chain_id = Self::numeric_chain_id(chain)?;

        let (endpoint, payload) = if options.is_sponsored {
            (
                format!("{}/relays/v2/sponsored-call", self.base_url),
                json!({
                    "chainId": chain_id,
                    "target": tx.to,
                    "data": tx.data,
                    "gasLimit": options.gas_limit,
                }),
            )
        } else {
            (
                format!("{}/relays/v2/call-with-sync-fee", self.base_url),
                json!({
                    "chainId": chain_id,
                    "target": tx.to,
                    "data": tx.data,
                    "feeToken": options.gas_token,
                    "gasLimit": options.gas_limit,
                    "isRelayContext": true,
                }),
            )
        };

        let response = self
            .http
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Request(format!(
                "relay returned {}",
                response.status()
            )));
        }

        let task: RelayTaskResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        info!(chain = chain.id, task_id = %task.task_id, "Relay task submitted");

        Ok(RelayResponse {
            task_id: task.task_id,
        })
    }
}
