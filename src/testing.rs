// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory doubles for the external collaborators, shared by the session,
//! relay and ramp tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::blockchain::{Chain, ChainClient};
use crate::providers::{
    AuthClient, AuthClientFactory, ClientError, MetaTransactionData, MetaTransactionOptions,
    MoneriumAuth, MoneriumAuthContext, MoneriumBalance, MoneriumClient, MoneriumConnection,
    MoneriumProfile, ProtocolClient, ProtocolClientFactory, RelayClient, RelayResponse,
    SignInResult, StripeClient, StripeSession, StripeSessionRequest,
};
use crate::session::SessionManager;
use crate::storage::LocalStore;

pub const TEST_EOA: &str = "0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1";
pub const TEST_TASK_ID: &str = "task-0001";
pub const TEST_COUNTERFACTUAL: &str = "0xCF00000000000000000000000000000000000001";

pub struct MockAuthClient {
    chain: &'static Chain,
    safes: Vec<String>,
    fail_sign_in: bool,
    provider: RwLock<Option<Arc<ChainClient>>>,
    pub sign_out_calls: AtomicUsize,
}

#[async_trait]
impl AuthClient for MockAuthClient {
    async fn sign_in(&self) -> Result<SignInResult, ClientError> {
        if self.fail_sign_in {
            return Err(ClientError::Auth("mock sign-in rejected".to_string()));
        }
        let client = ChainClient::new(self.chain)
            .map_err(|e| ClientError::NotInitialized(e.to_string()))?;
        *self.provider.write().unwrap() = Some(Arc::new(client));
        Ok(SignInResult {
            eoa: TEST_EOA.to_string(),
            safes: self.safes.clone(),
        })
    }

    fn provider(&self) -> Option<Arc<ChainClient>> {
        self.provider.read().unwrap().clone()
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.provider.write().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockAuthFactory {
    pub safes: Vec<String>,
    pub fail_sign_in: bool,
    pub build_delay: Option<Duration>,
    pub builds: AtomicUsize,
    pub last_client: Mutex<Option<Arc<MockAuthClient>>>,
}

impl MockAuthFactory {
    pub fn with_safes(safes: Vec<String>) -> Self {
        Self {
            safes,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AuthClientFactory for MockAuthFactory {
    async fn build(&self, chain: &'static Chain) -> Result<Arc<dyn AuthClient>, ClientError> {
        if let Some(delay) = self.build_delay {
            tokio::time::sleep(delay).await;
        }
        self.builds.fetch_add(1, Ordering::SeqCst);
        let client = Arc::new(MockAuthClient {
            chain,
            safes: self.safes.clone(),
            fail_sign_in: self.fail_sign_in,
            provider: RwLock::new(None),
            sign_out_calls: AtomicUsize::new(0),
        });
        *self.last_client.lock().unwrap() = Some(Arc::clone(&client));
        Ok(client)
    }
}

pub struct MockProtocolClient {
    pub address: String,
    pub address_delay: Option<Duration>,
}

#[async_trait]
impl ProtocolClient for MockProtocolClient {
    async fn get_address(&self) -> Result<String, ClientError> {
        if let Some(delay) = self.address_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.address.clone())
    }
}

pub struct MockProtocolFactory {
    pub address: String,
    pub build_delay: Option<Duration>,
    pub address_delay: Option<Duration>,
}

impl Default for MockProtocolFactory {
    fn default() -> Self {
        Self {
            address: TEST_COUNTERFACTUAL.to_string(),
            build_delay: None,
            address_delay: None,
        }
    }
}

#[async_trait]
impl ProtocolClientFactory for MockProtocolFactory {
    async fn build(
        &self,
        _owner_eoa: &str,
        _provider: Arc<ChainClient>,
    ) -> Result<Arc<dyn ProtocolClient>, ClientError> {
        if let Some(delay) = self.build_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Arc::new(MockProtocolClient {
            address: self.address.clone(),
            address_delay: self.address_delay,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRelay {
    pub chain_id: String,
    pub transactions: Vec<MetaTransactionData>,
    pub options: MetaTransactionOptions,
}

#[derive(Default)]
pub struct MockRelayClient {
    pub fail: bool,
    pub requests: Mutex<Vec<RecordedRelay>>,
}

impl MockRelayClient {
    pub fn last_request(&self) -> Option<RecordedRelay> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RelayClient for MockRelayClient {
    async fn relay_transaction(
        &self,
        chain: &'static Chain,
        transactions: &[MetaTransactionData],
        options: &MetaTransactionOptions,
    ) -> Result<RelayResponse, ClientError> {
        self.requests.lock().unwrap().push(RecordedRelay {
            chain_id: chain.id.to_string(),
            transactions: transactions.to_vec(),
            options: options.clone(),
        });
        if self.fail {
            return Err(ClientError::Request("mock relay unavailable".to_string()));
        }
        Ok(RelayResponse {
            task_id: TEST_TASK_ID.to_string(),
        })
    }
}

#[derive(Default)]
pub struct MockStripeClient {
    pub opened: Mutex<Vec<StripeSessionRequest>>,
    pub closed: Mutex<Vec<String>>,
}

#[async_trait]
impl StripeClient for MockStripeClient {
    async fn open(&self, request: &StripeSessionRequest) -> Result<StripeSession, ClientError> {
        self.opened.lock().unwrap().push(request.clone());
        Ok(StripeSession {
            id: "cos_mock".to_string(),
            client_secret: "secret_mock".to_string(),
            status: "initialized".to_string(),
        })
    }

    async fn close(&self, session_id: &str) -> Result<(), ClientError> {
        self.closed.lock().unwrap().push(session_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockMoneriumClient {
    pub fail_open: bool,
    pub opened_with: Mutex<Vec<MoneriumAuth>>,
    pub close_calls: AtomicUsize,
}

#[async_trait]
impl MoneriumClient for MockMoneriumClient {
    async fn open(&self, auth: &MoneriumAuth) -> Result<MoneriumConnection, ClientError> {
        self.opened_with.lock().unwrap().push(auth.clone());
        if self.fail_open {
            return Err(ClientError::Auth("mock token exchange failed".to_string()));
        }
        Ok(MoneriumConnection {
            access_token: "mock-access".to_string(),
            refresh_token: "mock-refresh".to_string(),
        })
    }

    async fn auth_context(
        &self,
        _connection: &MoneriumConnection,
    ) -> Result<MoneriumAuthContext, ClientError> {
        Ok(MoneriumAuthContext {
            name: "Jane Doe".to_string(),
            default_profile: "profile-1".to_string(),
        })
    }

    async fn profile(
        &self,
        _connection: &MoneriumConnection,
        profile_id: &str,
    ) -> Result<MoneriumProfile, ClientError> {
        Ok(MoneriumProfile {
            id: profile_id.to_string(),
            name: "Jane Doe".to_string(),
            accounts: vec![crate::providers::MoneriumAccount {
                iban: Some("IS12 3456 7890".to_string()),
                currency: "eur".to_string(),
                address: None,
            }],
        })
    }

    async fn balances(
        &self,
        _connection: &MoneriumConnection,
        _profile_id: &str,
    ) -> Result<Vec<MoneriumBalance>, ClientError> {
        Ok(vec![MoneriumBalance {
            currency: "eur".to_string(),
            amount: "250.00".to_string(),
        }])
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Everything a session test needs, with the temp dir kept alive.
pub struct TestHarness {
    pub manager: Arc<SessionManager>,
    pub store: Arc<LocalStore>,
    pub auth_factory: Arc<MockAuthFactory>,
    pub relay: Arc<MockRelayClient>,
    pub stripe: Arc<MockStripeClient>,
    pub monerium: Arc<MockMoneriumClient>,
    _data_dir: TempDir,
}

impl TestHarness {
    pub fn new(auth_factory: MockAuthFactory) -> Self {
        Self::build(auth_factory, MockProtocolFactory::default(), MockRelayClient::default())
    }

    pub fn build(
        auth_factory: MockAuthFactory,
        protocol_factory: MockProtocolFactory,
        relay: MockRelayClient,
    ) -> Self {
        let data_dir = TempDir::new().expect("temp dir");
        let store =
            Arc::new(LocalStore::open(data_dir.path().join("session.redb")).expect("store"));

        let auth_factory = Arc::new(auth_factory);
        let relay = Arc::new(relay);
        let stripe = Arc::new(MockStripeClient::default());
        let monerium = Arc::new(MockMoneriumClient::default());

        let manager = SessionManager::new(
            Arc::clone(&store),
            Arc::clone(&auth_factory) as Arc<dyn AuthClientFactory>,
            Arc::new(protocol_factory),
            Arc::clone(&relay) as Arc<dyn RelayClient>,
            Some(Arc::clone(&stripe) as Arc<dyn StripeClient>),
            Some(Arc::clone(&monerium) as Arc<dyn MoneriumClient>),
        );

        Self {
            manager,
            store,
            auth_factory,
            relay,
            stripe,
            monerium,
            _data_dir: data_dir,
        }
    }

    /// Start on a chain and wait for the auth client to come up.
    pub async fn start_and_wait(&self, startup_url: Option<&str>) {
        self.manager.start(startup_url).await.expect("start");
        self.wait_for_auth_client().await;
    }

    pub async fn wait_for_auth_client(&self) {
        for _ in 0..200 {
            if self.manager.snapshot().await.auth_client_ready {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("auth client never became ready");
    }

    pub async fn wait_for_selection(&self) -> String {
        for _ in 0..200 {
            if let Some(safe) = self.manager.snapshot().await.safe_selected {
                return safe;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no Safe was ever selected");
    }
}
