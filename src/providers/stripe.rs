// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stripe on-ramp client.
//!
//! The widget itself renders elsewhere; this client talks to the on-ramp
//! backend that mints widget sessions against the Stripe crypto API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{ClientError, StripeClient, StripeSession, StripeSessionRequest};
use crate::config::{env_required, STRIPE_ONRAMP_BACKEND_URL_ENV, STRIPE_PUBLIC_KEY_ENV};

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    client_secret: String,
    #[serde(default)]
    status: String,
}

/// HTTP client for the Stripe on-ramp backend.
#[derive(Debug, Clone)]
pub struct StripeOnrampClient {
    public_key: String,
    backend_url: String,
    http: Client,
}

impl StripeOnrampClient {
    pub fn from_env() -> Result<Self, ClientError> {
        let public_key = env_required(STRIPE_PUBLIC_KEY_ENV).map_err(ClientError::MissingConfig)?;
        let backend_url =
            env_required(STRIPE_ONRAMP_BACKEND_URL_ENV).map_err(ClientError::MissingConfig)?;
        Self::new(public_key, backend_url)
    }

    pub fn new(
        public_key: impl Into<String>,
        backend_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ClientError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            public_key: public_key.into(),
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl StripeClient for StripeOnrampClient {
    async fn open(&self, request: &StripeSessionRequest) -> Result<StripeSession, ClientError> {
        let payload = json!({
            "stripePublicKey": self.public_key,
            "transaction_details": {
                "wallet_address": request.wallet_address,
                "supported_destination_networks": request.supported_destination_networks,
                "supported_destination_currencies": request.supported_destination_currencies,
                "lock_wallet_address": request.lock_wallet_address,
            },
        });

        let response = self
            .http
            .post(format!("{}/api/v1/session", self.backend_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Request(format!(
                "on-ramp backend returned {}",
                response.status()
            )));
        }

        let session: StripeSessionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        info!(session_id = %session.id, "Stripe on-ramp session opened");

        Ok(StripeSession {
            id: session.id,
            client_secret: session.client_secret,
            status: session.status,
        })
    }

    async fn close(&self, session_id: &str) -> Result<(), ClientError> {
        // The backend expires sessions on its own; closing is a local
        // teardown plus a best-effort notification.
        let response = self
            .http
            .delete(format!("{}/api/v1/session/{}", self.backend_url, session_id))
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(ClientError::Request(format!(
                "on-ramp backend returned {}",
                response.status()
            )));
        }

        info!(session_id = %session_id, "Stripe on-ramp session closed");
        Ok(())
    }
}
