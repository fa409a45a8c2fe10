// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Monerium on/off-ramp client.
//!
//! Opens an authorized connection from either an OAuth `code` captured on the
//! redirect URL or a previously persisted refresh token, then serves the
//! three dependent lookups the flow snapshot is assembled from: auth context,
//! profile, balances.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{
    ClientError, MoneriumAuth, MoneriumAuthContext, MoneriumBalance, MoneriumClient,
    MoneriumConnection, MoneriumProfile,
};
use crate::config::{
    env_or_default, env_required, MONERIUM_CLIENT_ID_ENV, MONERIUM_ENVIRONMENT_ENV,
    MONERIUM_REDIRECT_URL_ENV,
};

const SANDBOX_API_BASE_URL: &str = "https://api.monerium.dev";
const PRODUCTION_API_BASE_URL: &str = "https://api.monerium.app";

/// Monerium deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneriumEnvironment {
    Sandbox,
    Production,
}

impl MoneriumEnvironment {
    fn api_base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_API_BASE_URL,
            Self::Production => PRODUCTION_API_BASE_URL,
        }
    }

    fn parse(raw: &str) -> Result<Self, ClientError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(ClientError::MissingConfig(format!(
                "unknown Monerium environment `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<MoneriumBalance>,
}

/// HTTP client for the Monerium REST API.
#[derive(Debug, Clone)]
pub struct MoneriumHttpClient {
    base_url: String,
    client_id: String,
    redirect_url: String,
    http: Client,
}

impl MoneriumHttpClient {
    pub fn from_env() -> Result<Self, ClientError> {
        let client_id = env_required(MONERIUM_CLIENT_ID_ENV).map_err(ClientError::MissingConfig)?;
        let redirect_url =
            env_required(MONERIUM_REDIRECT_URL_ENV).map_err(ClientError::MissingConfig)?;
        let environment =
            MoneriumEnvironment::parse(&env_or_default(MONERIUM_ENVIRONMENT_ENV, "sandbox"))?;

        Self::new(client_id, environment, redirect_url)
    }

    pub fn new(
        client_id: impl Into<String>,
        environment: MoneriumEnvironment,
        redirect_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_base_url(client_id, environment.api_base_url(), redirect_url)
    }

    /// Construct against an explicit base URL (tests).
    pub fn with_base_url(
        client_id: impl Into<String>,
        base_url: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ClientError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            redirect_url: redirect_url.into(),
            http,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        connection: &MoneriumConnection,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&connection.access_token)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if response.status().as_u16() == 401 {
            return Err(ClientError::Auth("bearer token rejected".to_string()));
        }
        if !response.status().is_success() {
            return Err(ClientError::Request(format!(
                "Monerium returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MoneriumClient for MoneriumHttpClient {
    async fn open(&self, auth: &MoneriumAuth) -> Result<MoneriumConnection, ClientError> {
        let mut form: Vec<(&str, &str)> = vec![("client_id", self.client_id.as_str())];

        match auth {
            MoneriumAuth::AuthCode(code) => {
                form.push(("grant_type", "authorization_code"));
                form.push(("code", code));
                form.push(("redirect_uri", self.redirect_url.as_str()));
            }
            MoneriumAuth::RefreshToken(token) => {
                form.push(("grant_type", "refresh_token"));
                form.push(("refresh_token", token));
            }
        }

        let response = self
            .http
            .post(format!("{}/auth/token", self.base_url))
            .form(&form)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Auth(format!(
                "token exchange returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        info!("Monerium flow opened");

        Ok(MoneriumConnection {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }

    async fn auth_context(
        &self,
        connection: &MoneriumConnection,
    ) -> Result<MoneriumAuthContext, ClientError> {
        self.get_json(connection, "/auth/context").await
    }

    async fn profile(
        &self,
        connection: &MoneriumConnection,
        profile_id: &str,
    ) -> Result<MoneriumProfile, ClientError> {
        self.get_json(connection, &format!("/profiles/{profile_id}"))
            .await
    }

    async fn balances(
        &self,
        connection: &MoneriumConnection,
        profile_id: &str,
    ) -> Result<Vec<MoneriumBalance>, ClientError> {
        let response: BalancesResponse = self
            .get_json(connection, &format!("/profiles/{profile_id}/balances"))
            .await?;
        Ok(response.balances)
    }

    async fn close(&self) -> Result<(), ClientError> {
        // Monerium has no server-side close; invalidation happens by
        // discarding the persisted refresh token.
        info!("Monerium flow closed");
        Ok(())
    }
}
