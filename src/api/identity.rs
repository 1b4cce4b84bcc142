// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Identity cache endpoints.
//!
//! The registration flow calls the upsert endpoint once a wallet finishes
//! on-chain registration and hands over the completed record; the remaining
//! endpoints exist for diagnostics and explicit cache resets.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    state::AppState,
    storage::{CacheStats, IdentityRecord},
};

/// Request to cache a completed wallet-to-DID registration.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpsertIdentityRequest {
    /// DID produced by the registration flow. Stored opaque, never parsed.
    pub did: String,
    /// Wallet address the DID was bound to.
    pub wallet_address: String,
    /// Display first name captured at registration.
    pub first_name: String,
    /// Display last name captured at registration.
    pub last_name: String,
    /// Wallet connector that produced the binding.
    pub wallet_type: String,
    /// Transaction hash of the registration event.
    pub tx_hash: String,
    /// Block height of the registration event.
    pub block_height: u64,
}

/// Response listing cached records.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IdentityListResponse {
    /// Records in storage order.
    pub records: Vec<IdentityRecord>,
    /// Total record count.
    pub total: usize,
}

/// Response after clearing the cache.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClearResponse {
    pub message: String,
}

/// Cache a completed registration record.
///
/// Replaces any record already held for the same wallet address
/// (last-write-wins, no merge).
#[utoipa::path(
    post,
    path = "/v1/identity",
    tag = "Identity",
    request_body = UpsertIdentityRequest,
    responses(
        (status = 201, description = "Record cached", body = IdentityRecord),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn upsert_identity(
    State(state): State<AppState>,
    Json(request): Json<UpsertIdentityRequest>,
) -> Result<(StatusCode, Json<IdentityRecord>), ApiError> {
    if request.did.is_empty() || request.wallet_address.is_empty() {
        return Err(ApiError::bad_request(
            "did and wallet_address are required",
        ));
    }

    let record = IdentityRecord {
        did: request.did,
        wallet_address: request.wallet_address,
        first_name: request.first_name,
        last_name: request.last_name,
        wallet_type: request.wallet_type,
        created_at: Utc::now(),
        tx_hash: request.tx_hash,
        block_height: request.block_height,
    };

    state.cache.upsert(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

/// Look up the cached record for one wallet address.
#[utoipa::path(
    get,
    path = "/v1/identity/{wallet_address}",
    tag = "Identity",
    params(("wallet_address" = String, Path, description = "Wallet address to look up")),
    responses(
        (status = 200, description = "Cached record", body = IdentityRecord),
        (status = 404, description = "No record for this address")
    )
)]
pub async fn get_identity(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> Result<Json<IdentityRecord>, ApiError> {
    state
        .cache
        .lookup(&wallet_address)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no identity cached for {wallet_address}")))
}

/// List all cached records. Diagnostics, not hot-path routing.
#[utoipa::path(
    get,
    path = "/v1/identity",
    tag = "Identity",
    responses(
        (status = 200, description = "All cached records", body = IdentityListResponse)
    )
)]
pub async fn list_identities(State(state): State<AppState>) -> Json<IdentityListResponse> {
    let records = state.cache.list_all();
    let total = records.len();
    Json(IdentityListResponse { records, total })
}

/// Drop the entire cache. Idempotent.
#[utoipa::path(
    delete,
    path = "/v1/identity",
    tag = "Identity",
    responses(
        (status = 200, description = "Cache cleared", body = ClearResponse)
    )
)]
pub async fn clear_identities(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    Json(ClearResponse {
        message: "identity cache cleared".to_string(),
    })
}

/// Cache statistics for observability.
#[utoipa::path(
    get,
    path = "/v1/identity/stats",
    tag = "Identity",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStats)
    )
)]
pub async fn identity_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}
