// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Manager
//!
//! Owns the wallet-auth client lifecycle and the single active session:
//! sign-in/sign-out, chain switching, Safe selection, balance polling, and
//! the relay/ramp state that is only meaningful while a session is live.
//!
//! ## Chain switches
//!
//! The auth client is chain-bound, so every chain change tears the session
//! down and re-initializes the client against the new chain's config. Session
//! state, Safe selection and the relay task are reset *before* any new value
//! is computed, so no cross-chain state leaks. Re-initialization is
//! asynchronous; each init task carries a generation number and a
//! `CancellationToken`, and a newer change cancels the stale in-flight init
//! so a stale client is never applied. The latest change wins.

pub mod resolver;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::blockchain::{get_chain, initial_chain, Chain, ChainClient, Erc20TokenInfo, TokenBalance};
use crate::onramp::MoneriumInfo;
use crate::poller::{Poller, DEFAULT_POLL_INTERVAL};
use crate::providers::{
    AuthClient, AuthClientFactory, MoneriumClient, ProtocolClient, ProtocolClientFactory,
    RelayClient, StripeClient, StripeSession,
};
use crate::redirect;
use crate::storage::{LocalStore, IS_AUTHENTICATED_KEY, MONERIUM_SELECTED_SAFE_KEY};

use resolver::{select_safe, SafeSelectionPolicy};

/// Zero address: the native token when used as a relay gas token.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown chain id: {0}")]
    UnknownChain(String),

    #[error("auth client is still initializing")]
    AuthClientNotReady,

    #[error("sign-in failed: {0}")]
    SignInFailed(String),

    #[error("no authenticated session")]
    NotAuthenticated,

    #[error("no web3 provider available")]
    NoProvider,

    #[error("no Safe selected")]
    NoSafeSelected,

    #[error("relay submission failed: {0}")]
    Relay(String),

    #[error("a relay task is already in flight")]
    RelayInFlight,

    #[error("ramp flow failed: {0}")]
    Ramp(String),

    #[error("ramp flow is not configured: {0}")]
    RampNotConfigured(String),
}

/// Relay task state, reset on chain change and logout.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct RelayTask {
    /// True from submission until the remote response (or error) arrives
    pub is_relay_loading: bool,
    /// Remote task identifier of the last submitted transaction
    pub gelato_task_id: Option<String>,
    /// Error from the last failed submission, cleared on the next attempt
    pub last_error: Option<String>,
}

/// Read-only view of the session for the HTTP surface.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Active chain id (hex)
    pub chain_id: String,
    /// Owner EOA, present while authenticated
    pub owner_address: Option<String>,
    /// Safes owned by the user
    pub safes: Vec<String>,
    /// Live authentication flag
    pub is_authenticated: bool,
    /// Whether the chain-bound auth client has finished initializing
    pub auth_client_ready: bool,
    /// Currently selected Safe (owned or counterfactual)
    pub safe_selected: Option<String>,
    /// Token used to pay relay fees (zero address = native)
    pub fee_token_address: String,
    /// Relay task state
    pub relay: RelayTask,
    /// Monerium flow snapshot, present while the flow is open
    pub monerium_info: Option<MoneriumInfo>,
    /// Open Stripe widget session id, if any
    pub stripe_session_id: Option<String>,
}

/// Latest polled balances of the selected Safe.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceSnapshot {
    /// Native balance, `None` before the first poll resolves
    pub native: Option<TokenBalance>,
    /// ERC-20 balances keyed by token address
    pub erc20: Option<HashMap<String, Erc20TokenInfo>>,
}

pub(crate) struct Inner {
    chain: &'static Chain,
    owner_address: Option<String>,
    safes: Vec<String>,
    provider: Option<Arc<ChainClient>>,
    is_authenticated: bool,
    /// Coarse flag rehydrated from storage, consulted by the route guard
    /// until the async client is ready; the live flag then takes precedence.
    coarse_authenticated: bool,
    fee_token_address: String,
    safe_selected: Option<String>,
    relay: RelayTask,
    auth_client: Option<Arc<dyn AuthClient>>,
    protocol_client: Option<Arc<dyn ProtocolClient>>,
    pub(crate) stripe_session: Option<StripeSession>,
    pub(crate) monerium_info: Option<MoneriumInfo>,
    native_poller: Option<Poller<TokenBalance>>,
    erc20_poller: Option<Poller<HashMap<String, Erc20TokenInfo>>>,
    /// Bumped on every chain switch; stale init tasks check it before
    /// applying their result.
    init_generation: u64,
}

/// Owner of the active session and all orchestration state.
pub struct SessionManager {
    /// Self-handle for the background init tasks this manager spawns.
    me: std::sync::Weak<Self>,
    pub(crate) inner: RwLock<Inner>,
    pub(crate) store: Arc<LocalStore>,
    auth_factory: Arc<dyn AuthClientFactory>,
    protocol_factory: Arc<dyn ProtocolClientFactory>,
    pub(crate) relay_client: Arc<dyn RelayClient>,
    pub(crate) stripe_client: Option<Arc<dyn StripeClient>>,
    pub(crate) monerium_client: Option<Arc<dyn MoneriumClient>>,
    init_cancel: std::sync::Mutex<CancellationToken>,
    poll_interval: std::sync::Mutex<Duration>,
}

impl SessionManager {
    pub fn new(
        store: Arc<LocalStore>,
        auth_factory: Arc<dyn AuthClientFactory>,
        protocol_factory: Arc<dyn ProtocolClientFactory>,
        relay_client: Arc<dyn RelayClient>,
        stripe_client: Option<Arc<dyn StripeClient>>,
        monerium_client: Option<Arc<dyn MoneriumClient>>,
    ) -> Arc<Self> {
        let coarse_authenticated = matches!(
            store.get(IS_AUTHENTICATED_KEY),
            Ok(Some(flag)) if flag == "true"
        );

        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            inner: RwLock::new(Inner {
                chain: initial_chain(),
                owner_address: None,
                safes: Vec::new(),
                provider: None,
                is_authenticated: false,
                coarse_authenticated,
                fee_token_address: ZERO_ADDRESS.to_string(),
                safe_selected: None,
                relay: RelayTask::default(),
                auth_client: None,
                protocol_client: None,
                stripe_session: None,
                monerium_info: None,
                native_poller: None,
                erc20_poller: None,
                init_generation: 0,
            }),
            store,
            auth_factory,
            protocol_factory,
            relay_client,
            stripe_client,
            monerium_client,
            init_cancel: std::sync::Mutex::new(CancellationToken::new()),
            poll_interval: std::sync::Mutex::new(DEFAULT_POLL_INTERVAL),
        })
    }

    /// Override the balance poll interval; pollers pick it up on their next
    /// restart.
    pub fn set_poll_interval(&self, interval: Duration) {
        *self.poll_interval.lock().expect("poll interval lock") = interval;
    }

    /// Select the startup chain and kick off the first client init.
    ///
    /// Redirect detection runs first: a `code` parameter on the startup URL
    /// forces the auth redirect chain.
    pub async fn start(&self, startup_url: Option<&str>) -> Result<(), SessionError> {
        let chain_id = redirect::initial_chain_id(startup_url);
        self.switch_chain(chain_id).await
    }

    /// Switch the active chain.
    ///
    /// Resets the session, Safe selection and relay task before anything new
    /// is computed, then re-initializes the auth client for the new chain in
    /// the background. A newer switch cancels the previous in-flight init.
    pub async fn switch_chain(&self, chain_id: &str) -> Result<(), SessionError> {
        let chain =
            get_chain(chain_id).ok_or_else(|| SessionError::UnknownChain(chain_id.to_string()))?;

        let generation = {
            let mut inner = self.inner.write().await;

            inner.owner_address = None;
            inner.safes.clear();
            inner.provider = None;
            inner.is_authenticated = false;
            inner.safe_selected = None;
            inner.relay = RelayTask::default();
            inner.stripe_session = None;
            inner.monerium_info = None;
            inner.auth_client = None;
            inner.protocol_client = None;
            stop_pollers(&mut inner);

            inner.chain = chain;
            inner.init_generation += 1;
            inner.init_generation
        };

        // Cancel the previous init; the latest change wins.
        let token = {
            let mut guard = self.init_cancel.lock().expect("init cancel lock");
            guard.cancel();
            *guard = CancellationToken::new();
            guard.clone()
        };

        info!(chain = chain.id, rpc = chain.rpc_url, "Chain switched, initializing auth client");

        let Some(manager) = self.me.upgrade() else {
            return Ok(());
        };
        tokio::spawn(async move {
            let built = tokio::select! {
                built = manager.auth_factory.build(chain) => built,
                _ = token.cancelled() => {
                    info!(chain = chain.id, "Auth client init cancelled by newer chain switch");
                    return;
                }
            };

            match built {
                Ok(client) => {
                    if token.is_cancelled() {
                        return;
                    }
                    let mut inner = manager.inner.write().await;
                    if inner.init_generation != generation {
                        // A newer switch landed while we were building.
                        return;
                    }
                    inner.auth_client = Some(client);
                    info!(chain = chain.id, "Auth client initialized");
                }
                Err(e) => {
                    // Initialization failures leave dependent state
                    // uninitialized; no automatic retry.
                    warn!(chain = chain.id, error = %e, "Auth client init failed");
                }
            }
        });

        Ok(())
    }

    /// Sign in through the wallet-auth collaborator.
    ///
    /// A no-op error until the chain-bound auth client has initialized. On
    /// success the owner EOA, owned Safes and provider handle are stored, the
    /// session is marked authenticated, and the coarse flag is persisted.
    pub async fn login(&self) -> Result<SessionSnapshot, SessionError> {
        let (client, chain) = {
            let inner = self.inner.read().await;
            match &inner.auth_client {
                Some(client) => (Arc::clone(client), inner.chain),
                None => {
                    warn!("Sign-in attempted before auth client initialization; ignoring");
                    return Err(SessionError::AuthClientNotReady);
                }
            }
        };

        let result = match client.sign_in().await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                return Err(SessionError::SignInFailed(e.to_string()));
            }
        };

        let provider = client.provider().ok_or(SessionError::NoProvider)?;

        {
            let mut inner = self.inner.write().await;

            // The chain may have switched while sign-in was in flight; a
            // stale client's result must not be applied.
            if !matches!(&inner.auth_client, Some(current) if Arc::ptr_eq(current, &client)) {
                warn!("Discarding sign-in result from a superseded auth client");
                return Err(SessionError::AuthClientNotReady);
            }

            inner.owner_address = Some(result.eoa.clone());
            inner.safes = result.safes.clone();
            inner.provider = Some(Arc::clone(&provider));
            inner.is_authenticated = true;
            inner.coarse_authenticated = true;
        }

        if let Err(e) = self.store.set(IS_AUTHENTICATED_KEY, "true") {
            warn!(error = %e, "Failed to persist authentication flag");
        }

        info!(chain = chain.id, owner = %result.eoa, safes = result.safes.len(), "Signed in");

        self.spawn_protocol_init(&result.eoa, provider);
        self.resolve_safe_selection().await;

        Ok(self.snapshot().await)
    }

    /// Sign out and clear all session-scoped state.
    ///
    /// Sign-out with the collaborator is best-effort; local state is cleared
    /// regardless. Open ramp flows are torn down.
    pub async fn logout(&self) {
        let client = self.inner.read().await.auth_client.clone();
        if let Some(client) = client {
            if let Err(e) = client.sign_out().await {
                warn!(error = %e, "Sign-out request failed; clearing local session anyway");
            }
        }

        // Tear down ramp flows first so their teardown can still read the
        // selected Safe.
        if let Err(e) = self.close_monerium_flow().await {
            warn!(error = %e, "Failed to close Monerium flow on logout");
        }
        if let Err(e) = self.close_stripe_widget().await {
            warn!(error = %e, "Failed to close Stripe widget on logout");
        }

        {
            let mut inner = self.inner.write().await;
            inner.owner_address = None;
            inner.safes.clear();
            inner.provider = None;
            inner.is_authenticated = false;
            inner.coarse_authenticated = false;
            inner.safe_selected = None;
            inner.relay = RelayTask::default();
            inner.protocol_client = None;
            inner.stripe_session = None;
            inner.monerium_info = None;
            stop_pollers(&mut inner);
        }

        if let Err(e) = self.store.remove(IS_AUTHENTICATED_KEY) {
            warn!(error = %e, "Failed to clear authentication flag");
        }

        info!("Signed out");
    }

    /// Set the token used to pay relay fees.
    pub async fn set_fee_token(&self, token_address: String) {
        self.inner.write().await.fee_token_address = token_address;
    }

    /// Re-derive the selected Safe.
    ///
    /// Policy: no provider → none; owned Safes → stored preference or first
    /// entry; otherwise the counterfactual address, which stays empty until
    /// the protocol client is ready.
    pub async fn resolve_safe_selection(&self) {
        let (provider_present, safes, protocol_client, generation) = {
            let inner = self.inner.read().await;
            (
                inner.provider.is_some(),
                inner.safes.clone(),
                inner.protocol_client.clone(),
                inner.init_generation,
            )
        };

        let stored = self
            .store
            .get(MONERIUM_SELECTED_SAFE_KEY)
            .unwrap_or_default();

        let selection = match select_safe(provider_present, &safes, stored.as_deref()) {
            SafeSelectionPolicy::NoSelection => None,
            SafeSelectionPolicy::Existing(address) => Some(address),
            SafeSelectionPolicy::Counterfactual => match protocol_client {
                Some(client) => match client.get_address().await {
                    Ok(address) => Some(address),
                    Err(e) => {
                        warn!(error = %e, "Counterfactual address lookup failed");
                        None
                    }
                },
                // Remains empty until the protocol client becomes available;
                // its init completion re-runs this resolver.
                None => None,
            },
        };

        let changed = {
            let mut inner = self.inner.write().await;
            // The session may have been cleared, or rebuilt against another
            // chain, while we were resolving.
            if inner.provider.is_none() || inner.init_generation != generation {
                return;
            }
            let changed = inner.safe_selected != selection;
            inner.safe_selected = selection.clone();
            changed
        };

        if changed {
            info!(safe = ?selection, "Safe selection updated");
            self.restart_balance_polling().await;
        }
    }

    fn spawn_protocol_init(&self, owner_eoa: &str, provider: Arc<ChainClient>) {
        let Some(manager) = self.me.upgrade() else {
            return;
        };
        let owner = owner_eoa.to_string();

        tokio::spawn(async move {
            let generation = manager.inner.read().await.init_generation;

            match manager.protocol_factory.build(&owner, provider).await {
                Ok(client) => {
                    {
                        let mut inner = manager.inner.write().await;
                        if inner.init_generation != generation {
                            return;
                        }
                        inner.protocol_client = Some(client);
                    }
                    info!("Account-abstraction client initialized");
                    // Re-run the resolver now that the counterfactual path
                    // can answer.
                    manager.resolve_safe_selection().await;
                }
                Err(e) => {
                    warn!(error = %e, "Account-abstraction client init failed");
                }
            }
        });
    }

    /// Restart the native and ERC-20 balance pollers for the current
    /// provider/selection, stopping any previous pollers first.
    pub async fn restart_balance_polling(&self) {
        let mut inner = self.inner.write().await;
        stop_pollers(&mut inner);

        let (Some(provider), Some(safe)) = (inner.provider.clone(), inner.safe_selected.clone())
        else {
            return;
        };

        let interval = *self.poll_interval.lock().expect("poll interval lock");

        let native_provider = Arc::clone(&provider);
        let native_safe = safe.clone();
        inner.native_poller = Some(Poller::spawn(interval, move || {
            let provider = Arc::clone(&native_provider);
            let safe = native_safe.clone();
            async move { provider.native_balance(&safe).await.ok() }
        }));

        inner.erc20_poller = Some(Poller::spawn(interval, move || {
            let provider = Arc::clone(&provider);
            let safe = safe.clone();
            async move { provider.erc20_balances(&safe).await.ok() }
        }));
    }

    /// Whether a protected route may be served.
    ///
    /// The live flag wins once the auth client is ready; while it is still
    /// initializing the coarse persisted flag answers, avoiding a flash of
    /// rejected requests right after a restart.
    pub async fn is_route_authorized(&self) -> bool {
        let inner = self.inner.read().await;
        if inner.auth_client.is_some() {
            inner.is_authenticated
        } else {
            inner.is_authenticated || inner.coarse_authenticated
        }
    }

    /// Current session view.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().await;
        SessionSnapshot {
            chain_id: inner.chain.id.to_string(),
            owner_address: inner.owner_address.clone(),
            safes: inner.safes.clone(),
            is_authenticated: inner.is_authenticated,
            auth_client_ready: inner.auth_client.is_some(),
            safe_selected: inner.safe_selected.clone(),
            fee_token_address: inner.fee_token_address.clone(),
            relay: inner.relay.clone(),
            monerium_info: inner.monerium_info.clone(),
            stripe_session_id: inner.stripe_session.as_ref().map(|s| s.id.clone()),
        }
    }

    /// Latest polled balances of the selected Safe.
    pub async fn balances(&self) -> BalanceSnapshot {
        let inner = self.inner.read().await;
        BalanceSnapshot {
            native: inner.native_poller.as_ref().and_then(|p| p.latest()),
            erc20: inner.erc20_poller.as_ref().and_then(|p| p.latest()),
        }
    }

    pub(crate) async fn relay_context(
        &self,
    ) -> Result<(&'static Chain, String, String), SessionError> {
        let inner = self.inner.read().await;
        if inner.provider.is_none() {
            return Err(SessionError::NoProvider);
        }
        let safe = inner
            .safe_selected
            .clone()
            .ok_or(SessionError::NoSafeSelected)?;
        Ok((inner.chain, safe, inner.fee_token_address.clone()))
    }

    pub(crate) async fn set_relay_loading(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.write().await;
        if inner.relay.is_relay_loading {
            return Err(SessionError::RelayInFlight);
        }
        inner.relay.is_relay_loading = true;
        inner.relay.last_error = None;
        Ok(())
    }

    pub(crate) async fn finish_relay(&self, outcome: Result<String, String>) {
        let mut inner = self.inner.write().await;
        inner.relay.is_relay_loading = false;
        match outcome {
            Ok(task_id) => inner.relay.gelato_task_id = Some(task_id),
            Err(error) => inner.relay.last_error = Some(error),
        }
    }

    pub(crate) async fn selected_safe(&self) -> Result<String, SessionError> {
        let inner = self.inner.read().await;
        if !inner.is_authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        inner
            .safe_selected
            .clone()
            .ok_or(SessionError::NoSafeSelected)
    }
}

fn stop_pollers(inner: &mut Inner) {
    if let Some(poller) = inner.native_poller.take() {
        poller.stop();
    }
    if let Some(poller) = inner.erc20_poller.take() {
        poller.stop();
    }
}
