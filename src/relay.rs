// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relay Orchestration
//!
//! Submits the demo transaction through the relay collaborator: a transfer of
//! 0.01 native currency from the selected Safe to itself, fees paid in the
//! session's configured gas token.

use tracing::{info, warn};
use uuid::Uuid;

use crate::providers::{MetaTransactionData, MetaTransactionOptions};
use crate::session::{SessionError, SessionManager};

/// 0.01 of the native currency, in wei.
pub const DEMO_TRANSFER_VALUE_WEI: &str = "10000000000000000";

/// Fixed gas limit for the demo transaction.
pub const DEMO_GAS_LIMIT: &str = "600000";

impl SessionManager {
    /// Submit the demo transaction and record the relay task id.
    ///
    /// The relay loading flag is set for the whole round trip and cleared on
    /// both outcomes; failures land in the relay task's `last_error` as well
    /// as the returned error.
    pub async fn relay_transaction(&self) -> Result<String, SessionError> {
        let attempt = Uuid::new_v4();
        let (chain, safe, fee_token) = self.relay_context().await?;

        let transactions = vec![MetaTransactionData {
            to: safe.clone(),
            data: "0x".to_string(),
            value: DEMO_TRANSFER_VALUE_WEI.to_string(),
            operation: 0,
        }];
        let options = MetaTransactionOptions {
            is_sponsored: false,
            gas_limit: DEMO_GAS_LIMIT.to_string(),
            gas_token: fee_token,
        };

        self.set_relay_loading().await?;

        match self
            .relay_client
            .relay_transaction(chain, &transactions, &options)
            .await
        {
            Ok(response) => {
                info!(%attempt, chain = chain.id, safe = %safe, task_id = %response.task_id, "Relay task submitted");
                self.finish_relay(Ok(response.task_id.clone())).await;
                Ok(response.task_id)
            }
            Err(e) => {
                warn!(%attempt, chain = chain.id, safe = %safe, error = %e, "Relay submission failed");
                self.finish_relay(Err(e.to_string())).await;
                Err(SessionError::Relay(e.to_string()))
            }
        }
    }
}
