// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! TOTP provisioning proxy endpoint.
//!
//! Thin boundary over [`ProvisioningClient`]: required-field validation
//! happens here, before any upstream contact, and upstream failures come
//! back as structured error bodies with an HTTP-style classification.

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::ApiError, provisioning::ProvisionOutcome, state::AppState};

/// Request to provision a TOTP secret for a DID.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProvisionRequest {
    /// DID to provision for.
    #[serde(default)]
    pub did: String,
    /// Wallet signature proving control of the DID.
    #[serde(default)]
    pub signature: String,
}

/// Proxy a TOTP provisioning request to the upstream function.
///
/// Missing `did` or `signature` is a client error and is rejected without
/// contacting the upstream.
#[utoipa::path(
    post,
    path = "/v1/totp/provision",
    tag = "Totp",
    request_body = ProvisionRequest,
    responses(
        (status = 200, description = "Provisioning succeeded", body = ProvisionOutcome),
        (status = 400, description = "Missing did or signature"),
        (status = 502, description = "Upstream provisioning failure"),
        (status = 503, description = "Provisioning not configured")
    )
)]
pub async fn provision_totp(
    State(state): State<AppState>,
    Json(request): Json<ProvisionRequest>,
) -> Result<Json<ProvisionOutcome>, ApiError> {
    if request.did.is_empty() || request.signature.is_empty() {
        return Err(ApiError::bad_request("did and signature are required"));
    }

    let provisioner = state
        .provisioner
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("TOTP provisioning is not configured"))?;

    let outcome = provisioner
        .provision(&request.did, &request.signature)
        .await?;
    Ok(Json(outcome))
}
