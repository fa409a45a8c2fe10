// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # External Collaborators
//!
//! Trait seams for every opaque third-party client the session orchestration
//! calls into: wallet auth, account abstraction (counterfactual addresses),
//! transaction relaying, and the Stripe/Monerium ramp flows.
//!
//! Each seam has an HTTP-backed production implementation in its own module;
//! tests substitute in-memory doubles.

pub mod gelato;
pub mod monerium;
pub mod protocol;
pub mod safe_auth;
pub mod stripe;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{Chain, ChainClient};

pub use gelato::GelatoRelayClient;
pub use monerium::{MoneriumEnvironment, MoneriumHttpClient};
pub use protocol::SafeProtocolFactory;
pub use safe_auth::SafeAuthFactory;
pub use stripe::StripeOnrampClient;

/// Errors from external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("client configuration missing: {0}")]
    MissingConfig(String),

    #[error("client not initialized: {0}")]
    NotInitialized(String),

    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response was invalid: {0}")]
    InvalidResponse(String),
}

/// Result of a successful sign-in with the wallet-auth collaborator.
#[derive(Debug, Clone)]
pub struct SignInResult {
    /// Externally-owned account backing the user's identity
    pub eoa: String,
    /// Safes owned by the user (may be empty for a fresh account)
    pub safes: Vec<String>,
}

/// Wallet-auth client (auth kit). One instance per chain; reconstructed when
/// the active chain changes.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Request sign-in, yielding the owner EOA and the owned Safes.
    async fn sign_in(&self) -> Result<SignInResult, ClientError>;

    /// Live provider handle, present after a successful sign-in.
    fn provider(&self) -> Option<Arc<ChainClient>>;

    /// Request sign-out. Best-effort; callers log failures and proceed.
    async fn sign_out(&self) -> Result<(), ClientError>;
}

/// Builds and initializes an [`AuthClient`] for a chain. Initialization is
/// asynchronous; sign-in is a no-op until it completes.
#[async_trait]
pub trait AuthClientFactory: Send + Sync {
    async fn build(&self, chain: &'static Chain) -> Result<Arc<dyn AuthClient>, ClientError>;
}

/// Account-abstraction client (protocol kit). Computes the deterministic
/// address a not-yet-deployed Safe would be assigned for an owner.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    async fn get_address(&self) -> Result<String, ClientError>;
}

/// Builds a [`ProtocolClient`] once a provider and owner are known.
#[async_trait]
pub trait ProtocolClientFactory: Send + Sync {
    async fn build(
        &self,
        owner_eoa: &str,
        provider: Arc<ChainClient>,
    ) -> Result<Arc<dyn ProtocolClient>, ClientError>;
}

/// One transaction in a relay request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetaTransactionData {
    /// Recipient address
    pub to: String,
    /// Calldata, hex-encoded (`0x` for a plain transfer)
    pub data: String,
    /// Value in wei, decimal string
    pub value: String,
    /// 0 = Call, 1 = DelegateCall
    pub operation: u8,
}

/// Options for a relay request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetaTransactionOptions {
    /// Whether the relay fee is sponsored
    pub is_sponsored: bool,
    /// Gas limit, decimal string
    pub gas_limit: String,
    /// Token used to pay the relay fee (zero address = native)
    pub gas_token: String,
}

/// Response from the relay collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelayResponse {
    /// Remote task identifier for the submitted transaction
    pub task_id: String,
}

/// Relay client (relay kit). Submits transactions with gas abstraction.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn relay_transaction(
        &self,
        chain: &'static Chain,
        transactions: &[MetaTransactionData],
        options: &MetaTransactionOptions,
    ) -> Result<RelayResponse, ClientError>;
}

/// Parameters for opening the Stripe on-ramp widget session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StripeSessionRequest {
    /// Destination wallet, pinned for the whole session
    pub wallet_address: String,
    /// Networks funds may be delivered on
    pub supported_destination_networks: Vec<String>,
    /// Currencies funds may be delivered in
    pub supported_destination_currencies: Vec<String>,
    /// Whether the wallet address is locked in the widget
    pub lock_wallet_address: bool,
}

/// Opaque session returned by the Stripe on-ramp backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StripeSession {
    /// Session identifier
    pub id: String,
    /// Client secret the widget embeds
    pub client_secret: String,
    /// Session status as reported by the backend
    pub status: String,
}

/// Stripe on-ramp client (onramp kit).
#[async_trait]
pub trait StripeClient: Send + Sync {
    async fn open(&self, request: &StripeSessionRequest) -> Result<StripeSession, ClientError>;

    async fn close(&self, session_id: &str) -> Result<(), ClientError>;
}

/// Credential used to open the Monerium flow.
#[derive(Debug, Clone)]
pub enum MoneriumAuth {
    /// OAuth `code` captured from the redirect URL
    AuthCode(String),
    /// Refresh token persisted from a previous flow
    RefreshToken(String),
}

/// Bearer credentials returned when the Monerium flow opens.
#[derive(Debug, Clone)]
pub struct MoneriumConnection {
    pub access_token: String,
    pub refresh_token: String,
}

/// Monerium auth context (who is authorized).
#[derive(Debug, Clone, Deserialize)]
pub struct MoneriumAuthContext {
    /// Display name of the authorized user
    #[serde(default)]
    pub name: String,
    /// Profile id used for the dependent profile/balances calls
    #[serde(rename = "defaultProfile")]
    pub default_profile: String,
}

/// Monerium profile details.
#[derive(Debug, Clone, Deserialize)]
pub struct MoneriumProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// IBANs associated with the profile
    #[serde(default)]
    pub accounts: Vec<MoneriumAccount>,
}

/// One account (IBAN) within a Monerium profile.
#[derive(Debug, Clone, Deserialize)]
pub struct MoneriumAccount {
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Balance entry reported by Monerium.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoneriumBalance {
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub amount: String,
}

/// Monerium on/off-ramp client (onramp kit).
#[async_trait]
pub trait MoneriumClient: Send + Sync {
    /// Exchange an auth code or refresh token for bearer credentials.
    async fn open(&self, auth: &MoneriumAuth) -> Result<MoneriumConnection, ClientError>;

    async fn auth_context(
        &self,
        connection: &MoneriumConnection,
    ) -> Result<MoneriumAuthContext, ClientError>;

    async fn profile(
        &self,
        connection: &MoneriumConnection,
        profile_id: &str,
    ) -> Result<MoneriumProfile, ClientError>;

    async fn balances(
        &self,
        connection: &MoneriumConnection,
        profile_id: &str,
    ) -> Result<Vec<MoneriumBalance>, ClientError>;

    /// Tear the flow down on the provider side. Best-effort.
    async fn close(&self) -> Result<(), ClientError>;
}
