// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route guard for session-scoped endpoints.
//!
//! Use the `Guard` extractor in handlers that require an authenticated
//! session:
//!
//! ```rust,ignore
//! async fn my_handler(_guard: Guard, State(state): State<AppState>) -> impl IntoResponse {
//!     // session is authenticated (or coarsely rehydrated)
//! }
//! ```
//!
//! While the chain-bound auth client is still initializing, the persisted
//! coarse flag stands in for the live one so a restarted service does not
//! bounce users who were signed in. Once the client is up the live session
//! flag is authoritative.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

/// Where unauthenticated callers should be sent.
pub const SIGN_IN_PATH: &str = "/signin";

/// Extractor that rejects requests without an authorized session.
pub struct Guard;

/// Rejection carrying the sign-in redirect hint.
#[derive(Debug, Serialize)]
pub struct GuardRejection {
    error: String,
    redirect_to: &'static str,
}

impl GuardRejection {
    fn new() -> Self {
        Self {
            error: "authentication required".to_string(),
            redirect_to: SIGN_IN_PATH,
        }
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

impl FromRequestParts<AppState> for Guard {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.session.is_route_authorized().await {
            Ok(Guard)
        } else {
            Err(GuardRejection::new())
        }
    }
}
