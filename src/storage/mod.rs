// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! # Identity Storage Module
//!
//! Persistence for the transitional wallet-to-DID cache.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   identities.json   # One JSON array of IdentityRecord (the whole cache)
//! ```
//!
//! The whole collection lives under a single named slot; there is no
//! per-record file and no schema versioning. Readers must tolerate an empty
//! or missing slot as "no records". The slot itself is a capability trait so
//! the cache runs unchanged against in-memory or file-backed storage.

pub mod identity_cache;
pub mod slot;

pub use identity_cache::{CacheStats, IdentityCache, IdentityRecord};
pub use slot::{FileSlot, MemorySlot, SlotAvailability, SlotError, StorageSlot, UnavailableSlot};

/// Well-known file name of the identity slot under the data directory.
pub const IDENTITY_SLOT_FILE: &str = "identities.json";
