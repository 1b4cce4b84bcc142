// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Consumption adapter around [`AuthRouter`] for presentation code.
//!
//! Owns the asynchronous lifecycle the UI needs: one automatic resolution on
//! activation, manual `refresh`, explicit loading state, and error surfacing.
//! Overlapping resolutions are ordered by a monotonically increasing
//! sequence number; a settling resolution is applied only if its sequence is
//! the highest seen so far, so the most recently *resolved* call wins and
//! stale resolutions are discarded rather than trusted to timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::{AuthRouteResult, AuthRouter, RouteVerdict};

/// What the UI sees: the latest applied verdict, whether a resolution is in
/// flight, and the last resolution failure if any.
///
/// "Never resolved" and "failed after succeeding once" are distinguished by
/// combining `route_result` with `error`: a failure leaves `route_result` at
/// its previous value instead of clearing it.
#[derive(Debug, Clone)]
pub struct RecognitionSnapshot {
    pub route_result: Option<AuthRouteResult>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct RecognitionState {
    /// Highest sequence number that has settled (applied or discarded).
    settled: u64,
    route_result: Option<AuthRouteResult>,
    error: Option<String>,
}

/// Async recognition handle over an [`AuthRouter`].
pub struct WalletRecognition {
    router: Arc<AuthRouter>,
    /// Sequence of the most recently issued resolution.
    issued: AtomicU64,
    state: RwLock<RecognitionState>,
}

impl WalletRecognition {
    /// Create a handle without triggering a resolution. Mostly useful for
    /// tests; UI code wants [`WalletRecognition::activate`].
    pub fn new(router: Arc<AuthRouter>) -> Arc<Self> {
        Arc::new(Self {
            router,
            issued: AtomicU64::new(0),
            state: RwLock::new(RecognitionState::default()),
        })
    }

    /// Create a handle and kick off the initial resolution in the
    /// background. The snapshot reports `is_loading` until it settles.
    pub fn activate(router: Arc<AuthRouter>) -> Arc<Self> {
        let handle = Self::new(router);
        // Reserve the sequence number before spawning so a snapshot taken
        // right after activation already observes the resolution in flight,
        // even if the background task has not been polled yet.
        let seq = handle.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let background = handle.clone();
        tokio::spawn(async move {
            background.resolve(seq).await;
        });
        handle
    }

    /// Re-resolve the route on demand, e.g. after a wallet reconnect or a
    /// completed identity registration.
    ///
    /// Safe to call concurrently with itself: each call gets its own
    /// sequence number and only the most recently resolved one is applied.
    /// There is no cancellation; superseded calls settle and are discarded.
    pub async fn refresh(&self) -> RecognitionSnapshot {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.resolve(seq).await
    }

    /// Run one resolution under an already-issued sequence number.
    async fn resolve(&self, seq: u64) -> RecognitionSnapshot {
        let result = self.router.determine_user_route().await;
        self.apply(seq, result).await;
        self.snapshot().await
    }

    /// Current adapter state.
    pub async fn snapshot(&self) -> RecognitionSnapshot {
        let state = self.state.read().await;
        RecognitionSnapshot {
            route_result: state.route_result.clone(),
            is_loading: self.issued.load(Ordering::SeqCst) > state.settled,
            error: state.error.clone(),
        }
    }

    /// Apply a settled resolution under the last-resolved-wins rule.
    async fn apply(&self, seq: u64, result: AuthRouteResult) {
        let mut state = self.state.write().await;
        if seq <= state.settled {
            debug!(seq, settled = state.settled, "discarding stale resolution");
            return;
        }
        state.settled = seq;

        if result.verdict == RouteVerdict::Error {
            // Keep the previous verdict visible; the failure is reported
            // through `error` so the UI can tell the two states apart.
            state.error = Some(result.reason);
        } else {
            state.route_result = Some(result);
            state.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::FixedWallet;
    use crate::storage::{IdentityCache, IdentityRecord, MemorySlot};
    use chrono::Utc;

    fn router_for(address: Option<&str>, seed: Option<(&str, &str)>) -> Arc<AuthRouter> {
        let cache = Arc::new(IdentityCache::new(Arc::new(MemorySlot::new())));
        if let Some((did, wallet_address)) = seed {
            cache.upsert(IdentityRecord {
                did: did.to_string(),
                wallet_address: wallet_address.to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                wallet_type: "keplr".to_string(),
                created_at: Utc::now(),
                tx_hash: "0xfeed".to_string(),
                block_height: 42,
            });
        }
        let wallet = match address {
            Some(address) => FixedWallet::connected(address),
            None => FixedWallet::disconnected(),
        };
        Arc::new(AuthRouter::new(Arc::new(wallet), cache))
    }

    fn error_result(reason: &str) -> AuthRouteResult {
        AuthRouteResult {
            verdict: RouteVerdict::Error,
            did: None,
            reason: reason.to_string(),
        }
    }

    fn returning_result(did: &str) -> AuthRouteResult {
        AuthRouteResult {
            verdict: RouteVerdict::ReturningUser,
            did: Some(did.to_string()),
            reason: "recognized".to_string(),
        }
    }

    #[tokio::test]
    async fn fresh_handle_has_no_result_and_is_not_loading() {
        let recognition = WalletRecognition::new(router_for(None, None));
        let snapshot = recognition.snapshot().await;
        assert!(snapshot.route_result.is_none());
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn refresh_resolves_and_clears_loading() {
        let recognition = WalletRecognition::new(router_for(
            Some("0xABC"),
            Some(("did:persona:123", "0xABC")),
        ));

        let snapshot = recognition.refresh().await;
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
        let result = snapshot.route_result.unwrap();
        assert_eq!(result.verdict, RouteVerdict::ReturningUser);
        assert_eq!(result.did.as_deref(), Some("did:persona:123"));
    }

    #[tokio::test]
    async fn activate_is_loading_before_initial_resolution_settles() {
        let recognition = WalletRecognition::activate(router_for(None, None));

        // On a current-thread runtime the spawned resolution has not been
        // polled yet, so the handle must already report the call in flight;
        // a handle that is neither loading nor resolved would be
        // indistinguishable from one that was never activated.
        let snapshot = recognition.snapshot().await;
        assert!(snapshot.is_loading || snapshot.route_result.is_some());
    }

    #[tokio::test]
    async fn activate_triggers_initial_resolution() {
        let recognition = WalletRecognition::activate(router_for(None, None));

        // Wait for the background resolution to settle
        for _ in 0..100 {
            if !recognition.snapshot().await.is_loading
                && recognition.snapshot().await.route_result.is_some()
            {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let snapshot = recognition.snapshot().await;
        assert_eq!(
            snapshot.route_result.unwrap().verdict,
            RouteVerdict::Disconnected
        );
    }

    #[tokio::test]
    async fn stale_resolution_is_discarded() {
        let recognition = WalletRecognition::new(router_for(None, None));

        // Newer resolution settles first
        recognition.apply(2, returning_result("did:persona:new")).await;
        // then the older one arrives and must be ignored
        recognition.apply(1, returning_result("did:persona:old")).await;

        let snapshot = recognition.snapshot().await;
        assert_eq!(
            snapshot.route_result.unwrap().did.as_deref(),
            Some("did:persona:new")
        );
    }

    #[tokio::test]
    async fn out_of_order_settle_keeps_loading_until_newest_lands() {
        let recognition = WalletRecognition::new(router_for(None, None));
        recognition.issued.store(2, Ordering::SeqCst);

        // Older call settles while the newer one is still in flight
        recognition.apply(1, returning_result("did:persona:old")).await;
        assert!(recognition.snapshot().await.is_loading);

        recognition.apply(2, returning_result("did:persona:new")).await;
        let snapshot = recognition.snapshot().await;
        assert!(!snapshot.is_loading);
        assert_eq!(
            snapshot.route_result.unwrap().did.as_deref(),
            Some("did:persona:new")
        );
    }

    #[tokio::test]
    async fn error_fills_error_and_preserves_previous_result() {
        let recognition = WalletRecognition::new(router_for(None, None));

        recognition.apply(1, returning_result("did:persona:123")).await;
        recognition.apply(2, error_result("connector unreachable")).await;

        let snapshot = recognition.snapshot().await;
        assert_eq!(snapshot.error.as_deref(), Some("connector unreachable"));
        // Previous result stays visible rather than being cleared
        assert_eq!(
            snapshot.route_result.unwrap().did.as_deref(),
            Some("did:persona:123")
        );
    }

    #[tokio::test]
    async fn first_failure_leaves_result_absent() {
        let recognition = WalletRecognition::new(router_for(None, None));

        recognition.apply(1, error_result("boom")).await;

        let snapshot = recognition.snapshot().await;
        assert!(snapshot.route_result.is_none());
        assert_eq!(snapshot.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn successful_refresh_clears_previous_error() {
        let recognition = WalletRecognition::new(router_for(None, None));

        recognition.apply(1, error_result("boom")).await;
        recognition.apply(2, returning_result("did:persona:123")).await;

        let snapshot = recognition.snapshot().await;
        assert!(snapshot.error.is_none());
        assert!(snapshot.route_result.is_some());
    }

    #[tokio::test]
    async fn concurrent_refreshes_settle_consistently() {
        let recognition = WalletRecognition::new(router_for(
            Some("0xABC"),
            Some(("did:persona:123", "0xABC")),
        ));

        let a = recognition.clone();
        let b = recognition.clone();
        let (ra, rb) = tokio::join!(a.refresh(), b.refresh());

        // Whichever resolved last, the final state is settled and identical
        assert!(!ra.is_loading || !rb.is_loading);
        let snapshot = recognition.snapshot().await;
        assert!(!snapshot.is_loading);
        assert_eq!(
            snapshot.route_result.unwrap().did.as_deref(),
            Some("did:persona:123")
        );
    }
}
