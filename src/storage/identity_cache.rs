// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Transitional wallet-address → DID record cache.
//!
//! The cache bridges the gap until the canonical chain-side DID registry
//! exists. It is deliberately simple: one JSON-encoded ordered list of
//! records in a single storage slot, address-keyed, overwrite-on-conflict.
//! It must never be treated as a system of record, so no guarantees beyond
//! single-writer atomic replace are provided; concurrent writers racing on
//! the same address are resolved by last write winning.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::slot::{SlotAvailability, SlotError, StorageSlot};

/// Note attached to [`CacheStats`] so diagnostics surfaces never mistake this
/// store for the registry.
const TRANSITIONAL_NOTE: &str =
    "transitional local cache; the chain-side DID registry is authoritative once available";

/// One cached wallet-to-DID binding.
///
/// Created elsewhere by the identity registration flow once on-chain
/// registration completes; this layer only stores and matches it. The `did`
/// is opaque here and is never parsed or validated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Stable decentralized identifier bound to the wallet.
    pub did: String,
    /// Wallet address the DID is bound to (natural key, matched exactly).
    pub wallet_address: String,
    /// Display first name captured at registration.
    pub first_name: String,
    /// Display last name captured at registration.
    pub last_name: String,
    /// Which wallet connector produced this binding.
    pub wallet_type: String,
    /// When the binding was registered. Immutable once set.
    pub created_at: DateTime<Utc>,
    /// Transaction hash of the on-chain registration event.
    pub tx_hash: String,
    /// Block height of the on-chain registration event.
    pub block_height: u64,
}

/// Observability snapshot of the cache contents.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheStats {
    /// Number of cached records.
    pub count: usize,
    /// Serialized size of the persisted collection in bytes.
    pub approximate_size_bytes: usize,
    /// Reminder that this store is not authoritative.
    pub note: &'static str,
}

/// Address-keyed identity cache over an injected storage slot.
///
/// Explicitly constructed and passed to collaborators; there is no global
/// instance. Callers always receive owned copies of records.
pub struct IdentityCache {
    slot: Arc<dyn StorageSlot>,
}

impl IdentityCache {
    pub fn new(slot: Arc<dyn StorageSlot>) -> Self {
        Self { slot }
    }

    /// Insert or replace the record for `record.wallet_address`.
    ///
    /// Any existing record for the same address is removed before the new one
    /// is appended, then the full collection is persisted. Persistence
    /// failures are logged and swallowed: this is a best-effort cache, and a
    /// failed write must never break the registration flow that produced the
    /// record.
    pub fn upsert(&self, record: IdentityRecord) {
        let mut records = self.load();
        records.retain(|existing| existing.wallet_address != record.wallet_address);
        records.push(record);
        self.persist(&records);
    }

    /// Look up the record for a wallet address.
    ///
    /// Pure read. An unavailable or faulted slot reads as "no record";
    /// faults are logged so they remain visible in diagnostics.
    pub fn lookup(&self, wallet_address: &str) -> Option<IdentityRecord> {
        match self.try_lookup(wallet_address) {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "identity cache read faulted, treating as empty");
                None
            }
        }
    }

    /// Look up a wallet address, keeping read faults visible.
    ///
    /// `Ok(None)` covers both "no record" and "no medium in this context";
    /// `Err` means the medium exists but the read failed, which callers on
    /// the routing path must surface as a fault rather than treat as an
    /// unregistered wallet.
    pub fn try_lookup(
        &self,
        wallet_address: &str,
    ) -> Result<Option<IdentityRecord>, SlotError> {
        Ok(self
            .load_checked()?
            .into_iter()
            .find(|record| record.wallet_address == wallet_address))
    }

    /// Whether a record exists for the address.
    pub fn has_record(&self, wallet_address: &str) -> bool {
        self.lookup(wallet_address).is_some()
    }

    /// All cached records in storage order. Diagnostics, not hot-path routing.
    pub fn list_all(&self) -> Vec<IdentityRecord> {
        self.load()
    }

    /// Drop the entire collection. Idempotent.
    pub fn clear(&self) {
        if let Err(e) = self.slot.remove() {
            warn!(error = %e, "identity cache clear failed");
        }
    }

    /// Current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let records = self.load();
        let approximate_size_bytes = serde_json::to_string(&records)
            .map(|payload| payload.len())
            .unwrap_or(0);
        CacheStats {
            count: records.len(),
            approximate_size_bytes,
            note: TRANSITIONAL_NOTE,
        }
    }

    /// Capability state of the backing slot.
    ///
    /// Exposed so callers can distinguish "no medium in this context" from
    /// "medium faulted" instead of coalescing both into an empty cache.
    pub fn availability(&self) -> SlotAvailability {
        self.slot.availability()
    }

    fn load(&self) -> Vec<IdentityRecord> {
        self.load_checked().unwrap_or_else(|e| {
            warn!(error = %e, "identity cache read faulted, treating as empty");
            Vec::new()
        })
    }

    /// Load the collection, coalescing an absent medium into "no records"
    /// but propagating read faults so they stay distinguishable.
    fn load_checked(&self) -> Result<Vec<IdentityRecord>, SlotError> {
        let payload = match self.slot.read() {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok(Vec::new()),
            Err(SlotError::Unavailable) => {
                debug!("identity cache medium unavailable, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str(&payload) {
            Ok(records) => Ok(records),
            Err(e) => {
                // A corrupt payload is unrecoverable here; the registry of
                // record lives on chain, so absence is the safe answer.
                warn!(error = %e, "identity cache payload corrupt, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn persist(&self, records: &[IdentityRecord]) {
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "identity cache serialization failed, skipping persist");
                return;
            }
        };
        if let Err(e) = self.slot.write(&payload) {
            warn!(error = %e, "identity cache persist failed");
        }
    }
}
