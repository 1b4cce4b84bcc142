// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Route-determination endpoint.
//!
//! The client reports its current wallet connection (or the lack of one) and
//! receives the routing verdict telling it which onboarding/login path to
//! present.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    routing::{AuthRouteResult, AuthRouter, FixedWallet},
    state::AppState,
};

/// Wallet connection as reported by the caller.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RouteQuery {
    /// Currently connected wallet address; omit while disconnected.
    pub wallet_address: Option<String>,
}

/// Determine the onboarding/login route for the reported wallet connection.
///
/// Always returns 200 with a structured verdict; expected absences
/// (disconnected wallet, unregistered wallet) and infrastructure faults are
/// all encoded in the verdict, never as error statuses.
#[utoipa::path(
    get,
    path = "/v1/auth/route",
    tag = "Routing",
    params(RouteQuery),
    responses(
        (status = 200, description = "Routing verdict for the reported connection", body = AuthRouteResult)
    )
)]
pub async fn determine_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Json<AuthRouteResult> {
    let wallet = match query.wallet_address {
        Some(address) if !address.is_empty() => FixedWallet::connected(address),
        _ => FixedWallet::disconnected(),
    };

    let router = AuthRouter::new(Arc::new(wallet), state.cache.clone());
    Json(router.determine_user_route().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteVerdict;
    use crate::storage::IdentityRecord;
    use chrono::Utc;

    fn seeded_state() -> AppState {
        let state = AppState::default();
        state.cache.upsert(IdentityRecord {
            did: "did:persona:123".to_string(),
            wallet_address: "0xABC".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            wallet_type: "keplr".to_string(),
            created_at: Utc::now(),
            tx_hash: "0xfeed".to_string(),
            block_height: 42,
        });
        state
    }

    #[tokio::test]
    async fn missing_address_yields_disconnected() {
        let Json(result) = determine_route(
            State(AppState::default()),
            Query(RouteQuery {
                wallet_address: None,
            }),
        )
        .await;
        assert_eq!(result.verdict, RouteVerdict::Disconnected);
        assert_eq!(result.did, None);
    }

    #[tokio::test]
    async fn empty_address_yields_disconnected() {
        let Json(result) = determine_route(
            State(AppState::default()),
            Query(RouteQuery {
                wallet_address: Some(String::new()),
            }),
        )
        .await;
        assert_eq!(result.verdict, RouteVerdict::Disconnected);
    }

    #[tokio::test]
    async fn registered_address_yields_returning_user() {
        let Json(result) = determine_route(
            State(seeded_state()),
            Query(RouteQuery {
                wallet_address: Some("0xABC".to_string()),
            }),
        )
        .await;
        assert_eq!(result.verdict, RouteVerdict::ReturningUser);
        assert_eq!(result.did.as_deref(), Some("did:persona:123"));
    }

    #[tokio::test]
    async fn unregistered_address_yields_new_user() {
        let Json(result) = determine_route(
            State(seeded_state()),
            Query(RouteQuery {
                wallet_address: Some("0xDEF".to_string()),
            }),
        )
        .await;
        assert_eq!(result.verdict, RouteVerdict::NewUser);
        assert_eq!(result.did, None);
    }
}
