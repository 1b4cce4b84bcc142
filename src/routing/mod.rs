// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! # Route Decision Module
//!
//! Decides, for the presently connected wallet, which onboarding or login
//! path the caller should present: create a new identity, continue as an
//! existing one, prompt for a wallet connection, or surface a fault.
//!
//! The router is stateless per call and read-only; every verdict is derived
//! fresh from live wallet-connection state plus the identity cache, so it
//! reflects the current wallet rather than a stale snapshot.

pub mod recognition;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::storage::IdentityCache;

pub use recognition::{RecognitionSnapshot, WalletRecognition};

/// Error type for wallet-provider queries.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet provider failed: {0}")]
    Provider(String),
}

/// External seam to the wallet connector SDK.
///
/// Supplies the currently connected address, or `None` while disconnected.
/// Key management and signing stay inside the provider; this crate only ever
/// asks "who is connected right now".
pub trait WalletProvider: Send + Sync {
    fn connected_address(&self) -> Result<Option<String>, WalletError>;
}

/// Provider over an already-known connection state.
///
/// The HTTP layer builds one per request from the client-reported address;
/// tests use it to pin each connection scenario.
#[derive(Debug, Clone, Default)]
pub struct FixedWallet {
    address: Option<String>,
}

impl FixedWallet {
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }

    pub fn disconnected() -> Self {
        Self { address: None }
    }
}

impl WalletProvider for FixedWallet {
    fn connected_address(&self) -> Result<Option<String>, WalletError> {
        Ok(self.address.clone())
    }
}

/// Which path the caller should present.
///
/// The set is open for extension; downstream matches must carry a fallback
/// arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RouteVerdict {
    /// Connected wallet with no cached identity: start registration.
    NewUser,
    /// Connected wallet already bound to a DID: continue as that identity.
    ReturningUser,
    /// No wallet connected: prompt for a connection first.
    Disconnected,
    /// Infrastructure fault while resolving; see the diagnostic reason.
    Error,
}

/// Routing verdict plus supporting detail. Recomputed per call, never
/// persisted or cached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthRouteResult {
    /// The decision itself.
    pub verdict: RouteVerdict,
    /// Resolved DID, present only for returning users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    /// Human-readable diagnostic for logs and UI copy.
    pub reason: String,
}

impl AuthRouteResult {
    fn new(verdict: RouteVerdict, did: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            verdict,
            did,
            reason: reason.into(),
        }
    }
}

/// Stateless-per-call decision engine over a wallet provider and the
/// identity cache.
pub struct AuthRouter {
    wallet: Arc<dyn WalletProvider>,
    cache: Arc<IdentityCache>,
}

impl AuthRouter {
    pub fn new(wallet: Arc<dyn WalletProvider>, cache: Arc<IdentityCache>) -> Self {
        Self { wallet, cache }
    }

    /// Produce the routing verdict for the current wallet connection.
    ///
    /// Never fails to the caller: expected absences (disconnected wallet,
    /// missing record) are verdicts, and infrastructure faults come back as
    /// [`RouteVerdict::Error`] with a diagnostic instead of an `Err`. The
    /// call performs no writes and is safe to repeat; it does not retry.
    pub async fn determine_user_route(&self) -> AuthRouteResult {
        let address = match self.wallet.connected_address() {
            Ok(Some(address)) => address,
            Ok(None) => {
                return AuthRouteResult::new(
                    RouteVerdict::Disconnected,
                    None,
                    "no wallet connected",
                );
            }
            Err(e) => {
                return AuthRouteResult::new(
                    RouteVerdict::Error,
                    None,
                    format!("wallet connection query failed: {e}"),
                );
            }
        };

        // A faulted medium is an infrastructure problem, not an absent
        // record; only a genuinely missing or unavailable store reads as
        // "no identity yet". The checked lookup keeps the two apart even
        // when the fault appears mid-read.
        match self.cache.try_lookup(&address) {
            Ok(Some(record)) => {
                debug!(wallet = %address, did = %record.did, "recognized returning user");
                AuthRouteResult::new(
                    RouteVerdict::ReturningUser,
                    Some(record.did),
                    format!("wallet {address} is bound to a registered identity"),
                )
            }
            Ok(None) => AuthRouteResult::new(
                RouteVerdict::NewUser,
                None,
                format!("wallet {address} has no registered identity"),
            ),
            Err(e) => AuthRouteResult::new(
                RouteVerdict::Error,
                None,
                format!("identity cache faulted: {e}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{
        IdentityRecord, MemorySlot, SlotAvailability, SlotError, StorageSlot, UnavailableSlot,
    };
    use chrono::Utc;

    struct FailingWallet;

    impl WalletProvider for FailingWallet {
        fn connected_address(&self) -> Result<Option<String>, WalletError> {
            Err(WalletError::Provider("connector unreachable".to_string()))
        }
    }

    struct FaultedSlot;

    impl StorageSlot for FaultedSlot {
        fn availability(&self) -> SlotAvailability {
            SlotAvailability::Faulted("disk error".to_string())
        }

        fn read(&self) -> Result<Option<String>, SlotError> {
            Err(SlotError::Io(std::io::Error::other("disk error")))
        }

        fn write(&self, _payload: &str) -> Result<(), SlotError> {
            Err(SlotError::Io(std::io::Error::other("disk error")))
        }

        fn remove(&self) -> Result<(), SlotError> {
            Err(SlotError::Io(std::io::Error::other("disk error")))
        }
    }

    /// Reports itself available but faults once the read actually happens,
    /// like a medium that disappears between the capability check and the
    /// read.
    struct ReadFaultSlot;

    impl StorageSlot for ReadFaultSlot {
        fn availability(&self) -> SlotAvailability {
            SlotAvailability::Available
        }

        fn read(&self) -> Result<Option<String>, SlotError> {
            Err(SlotError::Io(std::io::Error::other("read interrupted")))
        }

        fn write(&self, _payload: &str) -> Result<(), SlotError> {
            Err(SlotError::Io(std::io::Error::other("read interrupted")))
        }

        fn remove(&self) -> Result<(), SlotError> {
            Err(SlotError::Io(std::io::Error::other("read interrupted")))
        }
    }

    fn record(did: &str, wallet_address: &str) -> IdentityRecord {
        IdentityRecord {
            did: did.to_string(),
            wallet_address: wallet_address.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            wallet_type: "keplr".to_string(),
            created_at: Utc::now(),
            tx_hash: "0xfeed".to_string(),
            block_height: 42,
        }
    }

    fn cache() -> Arc<IdentityCache> {
        Arc::new(IdentityCache::new(Arc::new(MemorySlot::new())))
    }

    #[tokio::test]
    async fn disconnected_wallet_routes_to_disconnected() {
        let router = AuthRouter::new(Arc::new(FixedWallet::disconnected()), cache());

        let result = router.determine_user_route().await;
        assert_eq!(result.verdict, RouteVerdict::Disconnected);
        assert_eq!(result.did, None);
    }

    #[tokio::test]
    async fn unknown_wallet_routes_to_new_user() {
        let router = AuthRouter::new(Arc::new(FixedWallet::connected("0xABC")), cache());

        let result = router.determine_user_route().await;
        assert_eq!(result.verdict, RouteVerdict::NewUser);
        assert_eq!(result.did, None);
    }

    #[tokio::test]
    async fn cached_wallet_routes_to_returning_user_with_did() {
        let cache = cache();
        cache.upsert(record("did:persona:123", "0xABC"));
        let router = AuthRouter::new(Arc::new(FixedWallet::connected("0xABC")), cache);

        let result = router.determine_user_route().await;
        assert_eq!(result.verdict, RouteVerdict::ReturningUser);
        assert_eq!(result.did.as_deref(), Some("did:persona:123"));
    }

    #[tokio::test]
    async fn verdict_tracks_cache_state_across_repeated_calls() {
        let cache = cache();
        let router = AuthRouter::new(Arc::new(FixedWallet::connected("0xABC")), cache.clone());

        assert_eq!(
            router.determine_user_route().await.verdict,
            RouteVerdict::NewUser
        );

        cache.upsert(record("did:persona:123", "0xABC"));
        assert_eq!(
            router.determine_user_route().await.verdict,
            RouteVerdict::ReturningUser
        );
        // Repetition does not change the answer
        assert_eq!(
            router.determine_user_route().await.verdict,
            RouteVerdict::ReturningUser
        );

        cache.clear();
        assert_eq!(
            router.determine_user_route().await.verdict,
            RouteVerdict::NewUser
        );
    }

    #[tokio::test]
    async fn wallet_query_failure_routes_to_error() {
        let router = AuthRouter::new(Arc::new(FailingWallet), cache());

        let result = router.determine_user_route().await;
        assert_eq!(result.verdict, RouteVerdict::Error);
        assert!(result.reason.contains("connector unreachable"));
    }

    #[tokio::test]
    async fn unavailable_storage_still_routes_to_new_user() {
        let cache = Arc::new(IdentityCache::new(Arc::new(UnavailableSlot)));
        let router = AuthRouter::new(Arc::new(FixedWallet::connected("0xABC")), cache);

        let result = router.determine_user_route().await;
        assert_eq!(result.verdict, RouteVerdict::NewUser);
    }

    #[tokio::test]
    async fn faulted_storage_routes_to_error() {
        let cache = Arc::new(IdentityCache::new(Arc::new(FaultedSlot)));
        let router = AuthRouter::new(Arc::new(FixedWallet::connected("0xABC")), cache);

        let result = router.determine_user_route().await;
        assert_eq!(result.verdict, RouteVerdict::Error);
        assert!(result.reason.contains("disk error"));
    }

    #[tokio::test]
    async fn read_fault_on_available_slot_routes_to_error_not_new_user() {
        let cache = Arc::new(IdentityCache::new(Arc::new(ReadFaultSlot)));
        let router = AuthRouter::new(Arc::new(FixedWallet::connected("0xABC")), cache);

        let result = router.determine_user_route().await;
        assert_eq!(result.verdict, RouteVerdict::Error);
        assert!(result.reason.contains("read interrupted"));
    }
}
