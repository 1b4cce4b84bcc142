// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Remote TOTP provisioning proxy.
//!
//! Forwards `{did, signature}` to the upstream provisioning function and
//! normalizes its reply. Required-field validation happens at the API
//! boundary before this client is ever contacted; this module only deals
//! with a well-formed request and an untrusted upstream.

use std::{env, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::TOTP_PROVISION_URL_ENV;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Error type for provisioning calls.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("provisioning configuration missing: {0}")]
    MissingConfig(String),

    #[error("provisioning request failed: {0}")]
    Request(String),

    #[error("provisioning response was invalid: {0}")]
    InvalidResponse(String),

    #[error("provisioning upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

/// Normalized successful provisioning reply.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProvisionOutcome {
    /// Whether the upstream provisioned a secret.
    pub success: bool,
    /// Base32 TOTP secret, when provisioning succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// QR code payload for authenticator enrollment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    /// One-time backup codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_codes: Option<Vec<String>>,
}

/// Raw upstream reply; fields the upstream omits deserialize as `None`.
#[derive(Debug, Deserialize)]
struct UpstreamReply {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    qr_code: Option<String>,
    #[serde(default)]
    backup_codes: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the remote provisioning function.
#[derive(Debug, Clone)]
pub struct ProvisioningClient {
    function_url: String,
    http: Client,
}

impl ProvisioningClient {
    /// Whether the upstream is configured in this environment.
    pub fn is_configured() -> bool {
        env::var(TOTP_PROVISION_URL_ENV)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    pub fn from_env() -> Result<Self, ProvisioningError> {
        let function_url = env::var(TOTP_PROVISION_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ProvisioningError::MissingConfig(TOTP_PROVISION_URL_ENV.to_string())
            })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProvisioningError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { function_url, http })
    }

    /// Forward a provisioning request upstream and normalize the reply.
    ///
    /// `did` and `signature` must already be validated non-empty by the
    /// caller.
    pub async fn provision(
        &self,
        did: &str,
        signature: &str,
    ) -> Result<ProvisionOutcome, ProvisioningError> {
        let request_id = Uuid::new_v4().to_string();
        info!(%request_id, %did, "forwarding TOTP provisioning request");

        let response = self
            .http
            .post(&self.function_url)
            .header("x-request-id", &request_id)
            .json(&json!({ "did": did, "signature": signature }))
            .send()
            .await
            .map_err(|e| ProvisioningError::Request(e.to_string()))?;

        let status = response.status();
        let reply: UpstreamReply = response
            .json()
            .await
            .map_err(|e| ProvisioningError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(ProvisioningError::Upstream {
                status: status.as_u16(),
                message: reply
                    .error
                    .unwrap_or_else(|| "provisioning function failed".to_string()),
            });
        }

        if let Some(message) = reply.error {
            return Err(ProvisioningError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let success = reply.success.unwrap_or(reply.secret.is_some());
        if !success {
            return Err(ProvisioningError::InvalidResponse(
                "upstream reported neither a secret nor an error".to_string(),
            ));
        }

        Ok(ProvisionOutcome {
            success,
            secret: reply.secret,
            qr_code: reply.qr_code,
            backup_codes: reply.backup_codes,
        })
    }
}
