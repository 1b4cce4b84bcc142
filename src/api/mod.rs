// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod health;
pub mod identity;
pub mod route;
pub mod totp;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/route", get(route::determine_route))
        .route(
            "/identity",
            get(identity::list_identities)
                .post(identity::upsert_identity)
                .delete(identity::clear_identities),
        )
        .route("/identity/stats", get(identity::identity_stats))
        .route("/identity/{wallet_address}", get(identity::get_identity))
        .route("/totp/provision", post(totp::provision_totp))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        route::determine_route,
        identity::upsert_identity,
        identity::get_identity,
        identity::list_identities,
        identity::clear_identities,
        identity::identity_stats,
        totp::provision_totp,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            crate::routing::AuthRouteResult,
            crate::routing::RouteVerdict,
            crate::storage::IdentityRecord,
            crate::storage::CacheStats,
            crate::provisioning::ProvisionOutcome,
            identity::UpsertIdentityRequest,
            identity::IdentityListResponse,
            identity::ClearResponse,
            totp::ProvisionRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Routing", description = "Wallet-to-DID route determination"),
        (name = "Identity", description = "Transitional identity cache"),
        (name = "Totp", description = "TOTP provisioning proxy"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
struct ApiDoc;
