// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Session augmentation boundary types.
//!
//! The OAuth login pipeline lives outside this crate; on each token refresh
//! it attaches the access token plus the external account identity to the
//! session object. These types pin down that shape and keep chain identity
//! (the DID) keyed separately from the OAuth identity, so neither side ever
//! impersonates the other. No token verification happens here.

use serde::{Deserialize, Serialize};

use crate::storage::IdentityRecord;

/// OAuth-side identity attached by the external login pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuthSession {
    /// Bearer token for the upstream API, refreshed by the pipeline.
    pub access_token: String,

    /// Numeric account id at the external provider.
    pub account_id: i64,

    /// Account username at the external provider.
    pub username: String,
}

/// Session as consumed by presentation code: the OAuth identity plus the
/// independently-resolved chain identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AugmentedSession {
    #[serde(flatten)]
    pub oauth: OAuthSession,

    /// DID bound to the connected wallet, when one has been resolved.
    /// Absent means the wallet is unregistered or disconnected, never that
    /// the OAuth login failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
}

impl AugmentedSession {
    /// Session with no resolved chain identity.
    pub fn without_chain_identity(oauth: OAuthSession) -> Self {
        Self { oauth, did: None }
    }

    /// Attach the chain identity from a cached registration record.
    pub fn with_identity(oauth: OAuthSession, record: &IdentityRecord) -> Self {
        Self {
            oauth,
            did: Some(record.did.clone()),
        }
    }
}
