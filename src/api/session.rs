// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::session::SessionSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwitchChainRequest {
    /// Chain id, hex-encoded (e.g. `0x5`)
    pub chain_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeeTokenRequest {
    /// Token address used to pay relay fees (zero address = native)
    pub token_address: String,
}

#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses((status = 200, body = SessionSnapshot))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

#[utoipa::path(
    post,
    path = "/v1/session/login",
    tag = "Session",
    responses(
        (status = 200, body = SessionSnapshot),
        (status = 503, description = "Auth client still initializing")
    )
)]
pub async fn login(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.session.login().await?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/v1/session/logout",
    tag = "Session",
    responses((status = 204))
)]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.session.logout().await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    put,
    path = "/v1/session/chain",
    request_body = SwitchChainRequest,
    tag = "Session",
    responses(
        (status = 200, body = SessionSnapshot),
        (status = 400, description = "Unknown chain id")
    )
)]
pub async fn switch_chain(
    State(state): State<AppState>,
    Json(request): Json<SwitchChainRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.session.switch_chain(&request.chain_id).await?;
    Ok(Json(state.session.snapshot().await))
}

#[utoipa::path(
    put,
    path = "/v1/session/fee-token",
    request_body = FeeTokenRequest,
    tag = "Session",
    responses((status = 204))
)]
pub async fn set_fee_token(
    State(state): State<AppState>,
    Json(request): Json<FeeTokenRequest>,
) -> StatusCode {
    state.session.set_fee_token(request.token_address).await;
    StatusCode::NO_CONTENT
}
