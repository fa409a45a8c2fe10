// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::providers::RelayResponse;
use crate::session::RelayTask;
use crate::state::AppState;

use super::guard::Guard;

#[utoipa::path(
    post,
    path = "/v1/relay",
    tag = "Relay",
    responses(
        (status = 200, body = RelayResponse),
        (status = 401, description = "No authenticated session"),
        (status = 409, description = "No Safe selected or a relay task already in flight")
    )
)]
pub async fn submit_relay(
    _guard: Guard,
    State(state): State<AppState>,
) -> Result<Json<RelayResponse>, ApiError> {
    let task_id = state.session.relay_transaction().await?;
    Ok(Json(RelayResponse { task_id }))
}

#[utoipa::path(
    get,
    path = "/v1/relay",
    tag = "Relay",
    responses(
        (status = 200, body = RelayTask),
        (status = 401, description = "No authenticated session")
    )
)]
pub async fn get_relay(_guard: Guard, State(state): State<AppState>) -> Json<RelayTask> {
    Json(state.session.snapshot().await.relay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAuthFactory, TestHarness, TEST_TASK_ID};

    const SAFE: &str = "0xaaaa000000000000000000000000000000000001";

    #[tokio::test]
    async fn submit_returns_task_id_and_get_reflects_it() {
        let harness = TestHarness::new(MockAuthFactory::with_safes(vec![SAFE.to_string()]));
        harness.start_and_wait(None).await;
        harness.manager.login().await.unwrap();
        let state = AppState::new(harness.manager.clone());

        let response = submit_relay(Guard, State(state.clone())).await.unwrap();
        assert_eq!(response.0.task_id, TEST_TASK_ID);

        let task = get_relay(Guard, State(state)).await;
        assert_eq!(task.0.gelato_task_id.as_deref(), Some(TEST_TASK_ID));
    }

    #[tokio::test]
    async fn submit_without_session_is_conflict() {
        let harness = TestHarness::new(MockAuthFactory::default());
        harness.start_and_wait(None).await;
        let state = AppState::new(harness.manager.clone());

        let err = submit_relay(Guard, State(state)).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }
}
