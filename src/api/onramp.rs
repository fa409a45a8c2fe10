// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::onramp::MoneriumInfo;
use crate::providers::StripeSession;
use crate::state::AppState;

use super::guard::Guard;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MoneriumOpenRequest {
    /// OAuth `code` captured from the redirect URL; omitted to reuse the
    /// persisted refresh token
    #[serde(default)]
    pub auth_code: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/onramp/stripe/open",
    tag = "Onramp",
    responses(
        (status = 200, body = StripeSession),
        (status = 401, description = "No authenticated session"),
        (status = 503, description = "Stripe client not configured")
    )
)]
pub async fn open_stripe(
    _guard: Guard,
    State(state): State<AppState>,
) -> Result<Json<StripeSession>, ApiError> {
    let session = state.session.open_stripe_widget().await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/v1/onramp/stripe/close",
    tag = "Onramp",
    responses((status = 204))
)]
pub async fn close_stripe(
    _guard: Guard,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.session.close_stripe_widget().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/onramp/monerium/open",
    request_body = MoneriumOpenRequest,
    tag = "Onramp",
    responses(
        (status = 200, body = MoneriumInfo),
        (status = 401, description = "No authenticated session"),
        (status = 422, description = "No credential available or flow failed")
    )
)]
pub async fn open_monerium(
    _guard: Guard,
    State(state): State<AppState>,
    Json(request): Json<MoneriumOpenRequest>,
) -> Result<Json<MoneriumInfo>, ApiError> {
    let info = state.session.start_monerium_flow(request.auth_code).await?;
    Ok(Json(info))
}

#[utoipa::path(
    post,
    path = "/v1/onramp/monerium/close",
    tag = "Onramp",
    responses((status = 204))
)]
pub async fn close_monerium(
    _guard: Guard,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.session.close_monerium_flow().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/onramp/monerium",
    tag = "Onramp",
    responses(
        (status = 200, body = MoneriumInfo),
        (status = 404, description = "No open Monerium flow")
    )
)]
pub async fn get_monerium(
    _guard: Guard,
    State(state): State<AppState>,
) -> Result<Json<MoneriumInfo>, ApiError> {
    state
        .session
        .snapshot()
        .await
        .monerium_info
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no open Monerium flow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAuthFactory, TestHarness};

    const SAFE: &str = "0xaaaa000000000000000000000000000000000001";

    async fn state() -> (AppState, TestHarness) {
        let harness = TestHarness::new(MockAuthFactory::with_safes(vec![SAFE.to_string()]));
        harness.start_and_wait(None).await;
        harness.manager.login().await.unwrap();
        (AppState::new(harness.manager.clone()), harness)
    }

    #[tokio::test]
    async fn stripe_open_then_close() {
        let (state, _harness) = state().await;

        let session = open_stripe(Guard, State(state.clone())).await.unwrap();
        assert_eq!(session.0.id, "cos_mock");

        let status = close_stripe(Guard, State(state)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn monerium_open_exposes_snapshot() {
        let (state, _harness) = state().await;

        let info = open_monerium(
            Guard,
            State(state.clone()),
            Json(MoneriumOpenRequest {
                auth_code: Some("auth-code".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(info.0.safe_address, SAFE);

        let fetched = get_monerium(Guard, State(state)).await.unwrap();
        assert_eq!(fetched.0.safe_address, SAFE);
    }

    #[tokio::test]
    async fn monerium_get_without_flow_is_not_found() {
        let (state, _harness) = state().await;

        let err = get_monerium(Guard, State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
