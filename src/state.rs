// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

use std::sync::Arc;

use crate::provisioning::ProvisioningClient;
use crate::storage::{IdentityCache, MemorySlot};

/// Shared application state.
///
/// The cache is constructed once at startup and injected everywhere it is
/// consumed; nothing in the crate reaches for a global. The provisioning
/// client is optional because the upstream function is not configured in
/// every environment.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<IdentityCache>,
    pub provisioner: Option<Arc<ProvisioningClient>>,
}

impl AppState {
    pub fn new(cache: Arc<IdentityCache>, provisioner: Option<Arc<ProvisioningClient>>) -> Self {
        Self { cache, provisioner }
    }
}

impl Default for AppState {
    /// In-memory state with no upstream provisioner. Used by tests.
    fn default() -> Self {
        Self::new(
            Arc::new(IdentityCache::new(Arc::new(MemorySlot::new()))),
            None,
        )
    }
}
