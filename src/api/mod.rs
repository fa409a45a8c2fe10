// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{Erc20TokenInfo, TokenBalance},
    onramp::MoneriumInfo,
    providers::{MoneriumBalance, RelayResponse, StripeSession},
    session::{BalanceSnapshot, RelayTask, SessionSnapshot},
    state::AppState,
};

pub mod guard;
pub mod health;
pub mod onramp;
pub mod relay;
pub mod safe;
pub mod session;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/session", get(session::get_session))
        .route("/session/login", post(session::login))
        .route("/session/logout", post(session::logout))
        .route("/session/chain", put(session::switch_chain))
        .route("/session/fee-token", put(session::set_fee_token))
        .route("/safe", get(safe::get_safe))
        .route("/safe/balances", get(safe::get_balances))
        .route("/relay", post(relay::submit_relay).get(relay::get_relay))
        .route("/onramp/stripe/open", post(onramp::open_stripe))
        .route("/onramp/stripe/close", post(onramp::close_stripe))
        .route("/onramp/monerium", get(onramp::get_monerium))
        .route("/onramp/monerium/open", post(onramp::open_monerium))
        .route("/onramp/monerium/close", post(onramp::close_monerium))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        session::get_session,
        session::login,
        session::logout,
        session::switch_chain,
        session::set_fee_token,
        safe::get_safe,
        safe::get_balances,
        relay::submit_relay,
        relay::get_relay,
        onramp::open_stripe,
        onramp::close_stripe,
        onramp::open_monerium,
        onramp::close_monerium,
        onramp::get_monerium
    ),
    components(
        schemas(
            health::HealthResponse,
            SessionSnapshot,
            BalanceSnapshot,
            TokenBalance,
            Erc20TokenInfo,
            RelayTask,
            RelayResponse,
            StripeSession,
            MoneriumInfo,
            MoneriumBalance,
            session::SwitchChainRequest,
            session::FeeTokenRequest,
            safe::SafeSelection,
            onramp::MoneriumOpenRequest
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Session", description = "Session lifecycle and chain selection"),
        (name = "Safe", description = "Safe selection and balances"),
        (name = "Relay", description = "Gas-abstracted transaction relaying"),
        (name = "Onramp", description = "Stripe and Monerium ramp flows")
    )
)]
struct ApiDoc;
