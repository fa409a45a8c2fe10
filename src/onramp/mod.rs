// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # On/Off-Ramp Orchestration
//!
//! Drives the Stripe on-ramp widget session and the Monerium flow against
//! the active session. Both flows are optional: when the corresponding
//! client is not configured the open operations fail with a configuration
//! error and the close operations are no-ops.

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::providers::{MoneriumAuth, MoneriumBalance, StripeSession, StripeSessionRequest};
use crate::session::{SessionError, SessionManager};
use crate::storage::{MONERIUM_SELECTED_SAFE_KEY, MONERIUM_TOKEN_KEY};

/// Networks the Stripe widget may deliver funds on.
const STRIPE_NETWORKS: [&str; 2] = ["ethereum", "polygon"];

/// Currencies the Stripe widget may deliver funds in.
const STRIPE_CURRENCIES: [&str; 1] = ["usdc"];

/// Snapshot of an open Monerium flow.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MoneriumInfo {
    /// Safe the flow was opened for
    pub safe_address: String,
    /// Display name of the authorized user
    pub name: String,
    /// IBAN of the default profile, when one exists
    pub iban: Option<String>,
    /// E-money balances of the default profile
    pub balances: Vec<MoneriumBalance>,
}

impl SessionManager {
    /// Open the Stripe on-ramp widget session, pinned to the selected Safe.
    pub async fn open_stripe_widget(&self) -> Result<StripeSession, SessionError> {
        let client = self
            .stripe_client
            .as_ref()
            .ok_or_else(|| SessionError::RampNotConfigured("stripe".to_string()))?;

        let safe = self.selected_safe().await?;

        let request = StripeSessionRequest {
            wallet_address: safe.clone(),
            supported_destination_networks:
                STRIPE_NETWORKS.iter().map(|s| s.to_string()).collect(),
            supported_destination_currencies:
                STRIPE_CURRENCIES.iter().map(|s| s.to_string()).collect(),
            lock_wallet_address: true,
        };

        let session = client.open(&request).await.map_err(|e| {
            warn!(safe = %safe, error = %e, "Stripe widget open failed");
            SessionError::Ramp(e.to_string())
        })?;

        info!(safe = %safe, session_id = %session.id, "Stripe widget opened");
        self.inner.write().await.stripe_session = Some(session.clone());
        Ok(session)
    }

    /// Close the Stripe widget session, if one is open.
    pub async fn close_stripe_widget(&self) -> Result<(), SessionError> {
        let session = self.inner.write().await.stripe_session.take();
        let (Some(session), Some(client)) = (session, self.stripe_client.as_ref()) else {
            return Ok(());
        };

        client.close(&session.id).await.map_err(|e| {
            warn!(session_id = %session.id, error = %e, "Stripe widget close failed");
            SessionError::Ramp(e.to_string())
        })
    }

    /// Open the Monerium flow for the selected Safe.
    ///
    /// The selected Safe is persisted before the flow opens so the selection
    /// survives the OAuth round trip. The credential is the fresh auth code
    /// when one was captured on the redirect, otherwise the persisted refresh
    /// token; the refresh token from the exchange is persisted for the next
    /// open. The flow snapshot is then assembled from the auth context, its
    /// default profile, and that profile's balances.
    pub async fn start_monerium_flow(
        &self,
        auth_code: Option<String>,
    ) -> Result<MoneriumInfo, SessionError> {
        let client = self
            .monerium_client
            .as_ref()
            .ok_or_else(|| SessionError::RampNotConfigured("monerium".to_string()))?;

        let safe = self.selected_safe().await?;

        if let Err(e) = self.store.set(MONERIUM_SELECTED_SAFE_KEY, &safe) {
            warn!(error = %e, "Failed to persist Monerium Safe selection");
        }

        let auth = match auth_code {
            Some(code) => MoneriumAuth::AuthCode(code),
            None => {
                let stored = self
                    .store
                    .get(MONERIUM_TOKEN_KEY)
                    .map_err(|e| SessionError::Ramp(e.to_string()))?;
                match stored {
                    Some(token) => MoneriumAuth::RefreshToken(token),
                    None => {
                        return Err(SessionError::Ramp(
                            "no auth code and no stored refresh token".to_string(),
                        ))
                    }
                }
            }
        };

        let connection = client.open(&auth).await.map_err(|e| {
            warn!(safe = %safe, error = %e, "Monerium flow open failed");
            SessionError::Ramp(e.to_string())
        })?;

        if let Err(e) = self.store.set(MONERIUM_TOKEN_KEY, &connection.refresh_token) {
            warn!(error = %e, "Failed to persist Monerium refresh token");
        }

        let context = client
            .auth_context(&connection)
            .await
            .map_err(|e| SessionError::Ramp(e.to_string()))?;
        let profile = client
            .profile(&connection, &context.default_profile)
            .await
            .map_err(|e| SessionError::Ramp(e.to_string()))?;
        let balances = client
            .balances(&connection, &context.default_profile)
            .await
            .map_err(|e| SessionError::Ramp(e.to_string()))?;

        let info = MoneriumInfo {
            safe_address: safe.clone(),
            name: context.name,
            iban: profile.accounts.iter().find_map(|a| a.iban.clone()),
            balances,
        };

        info!(safe = %safe, profile = %profile.id, "Monerium flow opened");
        self.inner.write().await.monerium_info = Some(info.clone());
        Ok(info)
    }

    /// Close the Monerium flow: best-effort provider teardown, drop the
    /// persisted refresh token, clear the snapshot.
    pub async fn close_monerium_flow(&self) -> Result<(), SessionError> {
        let had_flow = {
            let mut inner = self.inner.write().await;
            inner.monerium_info.take().is_some()
        };

        if let Some(client) = self.monerium_client.as_ref() {
            if let Err(e) = client.close().await {
                warn!(error = %e, "Monerium provider-side close failed");
            }
        }

        if let Err(e) = self.store.remove(MONERIUM_TOKEN_KEY) {
            warn!(error = %e, "Failed to drop persisted Monerium token");
        }

        if had_flow {
            info!("Monerium flow closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MoneriumAuth;
    use crate::testing::{MockAuthFactory, TestHarness};

    const SAFE: &str = "0xaaaa000000000000000000000000000000000001";

    async fn logged_in_harness() -> TestHarness {
        let harness = TestHarness::new(MockAuthFactory::with_safes(vec![SAFE.to_string()]));
        harness.start_and_wait(None).await;
        harness.manager.login().await.expect("login");
        harness.wait_for_selection().await;
        harness
    }

    #[tokio::test]
    async fn stripe_widget_pins_selected_safe() {
        let harness = logged_in_harness().await;

        let session = harness.manager.open_stripe_widget().await.unwrap();
        assert_eq!(session.id, "cos_mock");

        let request = harness.stripe.opened.lock().unwrap().last().cloned().unwrap();
        assert_eq!(request.wallet_address, SAFE);
        assert!(request.lock_wallet_address);
        assert_eq!(request.supported_destination_networks, vec!["ethereum", "polygon"]);
        assert_eq!(request.supported_destination_currencies, vec!["usdc"]);

        let snapshot = harness.manager.snapshot().await;
        assert_eq!(snapshot.stripe_session_id.as_deref(), Some("cos_mock"));
    }

    #[tokio::test]
    async fn stripe_close_clears_session() {
        let harness = logged_in_harness().await;
        harness.manager.open_stripe_widget().await.unwrap();

        harness.manager.close_stripe_widget().await.unwrap();

        assert!(harness.manager.snapshot().await.stripe_session_id.is_none());
        assert_eq!(harness.stripe.closed.lock().unwrap().as_slice(), ["cos_mock"]);
    }

    #[tokio::test]
    async fn stripe_requires_authentication() {
        let harness = TestHarness::new(MockAuthFactory::default());
        harness.start_and_wait(None).await;

        let err = harness.manager.open_stripe_widget().await.unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn monerium_open_persists_selection_and_refresh_token() {
        let harness = logged_in_harness().await;

        let info = harness
            .manager
            .start_monerium_flow(Some("auth-code".to_string()))
            .await
            .unwrap();

        assert_eq!(info.safe_address, SAFE);
        assert_eq!(info.name, "Jane Doe");
        assert_eq!(info.iban.as_deref(), Some("IS12 3456 7890"));
        assert_eq!(info.balances[0].amount, "250.00");

        assert_eq!(
            harness.store.get("monerium_safe_selected").unwrap().as_deref(),
            Some(SAFE)
        );
        assert_eq!(
            harness.store.get("monerium_token").unwrap().as_deref(),
            Some("mock-refresh")
        );

        let opened = harness.monerium.opened_with.lock().unwrap();
        assert!(matches!(&opened[0], MoneriumAuth::AuthCode(code) if code == "auth-code"));
    }

    #[tokio::test]
    async fn monerium_reopen_uses_stored_refresh_token() {
        let harness = logged_in_harness().await;
        harness.store.set("monerium_token", "stored-refresh").unwrap();

        harness.manager.start_monerium_flow(None).await.unwrap();

        let opened = harness.monerium.opened_with.lock().unwrap();
        assert!(
            matches!(&opened[0], MoneriumAuth::RefreshToken(token) if token == "stored-refresh")
        );
    }

    #[tokio::test]
    async fn monerium_open_without_credential_fails() {
        let harness = logged_in_harness().await;

        let err = harness.manager.start_monerium_flow(None).await.unwrap_err();
        assert!(matches!(err, SessionError::Ramp(_)));
        assert!(harness.manager.snapshot().await.monerium_info.is_none());
    }

    #[tokio::test]
    async fn monerium_close_drops_token_and_snapshot() {
        let harness = logged_in_harness().await;
        harness
            .manager
            .start_monerium_flow(Some("auth-code".to_string()))
            .await
            .unwrap();

        harness.manager.close_monerium_flow().await.unwrap();

        assert!(harness.manager.snapshot().await.monerium_info.is_none());
        assert!(harness.store.get("monerium_token").unwrap().is_none());
        assert_eq!(
            harness.monerium.close_calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }
}
