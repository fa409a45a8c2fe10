// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::session::BalanceSnapshot;
use crate::state::AppState;

use super::guard::Guard;

#[derive(Debug, Serialize, ToSchema)]
pub struct SafeSelection {
    /// Currently selected Safe (owned or counterfactual); empty while the
    /// counterfactual lookup is still pending
    pub selected: Option<String>,
    /// All Safes owned by the signed-in user
    pub owned: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/v1/safe",
    tag = "Safe",
    responses(
        (status = 200, body = SafeSelection),
        (status = 401, description = "No authenticated session")
    )
)]
pub async fn get_safe(_guard: Guard, State(state): State<AppState>) -> Json<SafeSelection> {
    let snapshot = state.session.snapshot().await;
    Json(SafeSelection {
        selected: snapshot.safe_selected,
        owned: snapshot.safes,
    })
}

#[utoipa::path(
    get,
    path = "/v1/safe/balances",
    tag = "Safe",
    responses(
        (status = 200, body = BalanceSnapshot),
        (status = 401, description = "No authenticated session")
    )
)]
pub async fn get_balances(_guard: Guard, State(state): State<AppState>) -> Json<BalanceSnapshot> {
    Json(state.session.balances().await)
}
