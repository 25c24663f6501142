//! Claim session: one user-entered address, its polling, countdown and claim flow

use crate::api::SharedApi;
use crate::config::ClientConfig;
use crate::countdown::CountdownProjector;
use crate::orchestrator::{ClaimAttempt, ClaimMessages, ClaimOrchestrator};
use crate::poller::StatusPoller;
use crate::state::{SessionSnapshot, SessionState, SharedState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Owns the session state; everything else reads snapshots or goes through these operations
pub struct ClaimSession {
    config: ClientConfig,
    state: SharedState,
    poller: Arc<StatusPoller>,
    orchestrator: ClaimOrchestrator,
    shutdown: CancellationToken,
    is_running: AtomicBool,
}

impl ClaimSession {
    pub fn new(api: SharedApi, config: ClientConfig) -> Self {
        let state: SharedState = Arc::new(RwLock::new(SessionState::default()));
        let poller = Arc::new(StatusPoller::new(api.clone(), state.clone(), &config));
        let orchestrator = ClaimOrchestrator::new(
            api,
            state.clone(),
            poller.clone(),
            ClaimMessages {
                network_name: config.network_name.clone(),
                default_token_symbol: config.default_token_symbol.clone(),
            },
        );

        Self {
            config,
            state,
            poller,
            orchestrator,
            shutdown: CancellationToken::new(),
            is_running: AtomicBool::new(false),
        }
    }

    /// Start faucet info refresh and the countdown projector. Idempotent.
    pub fn start(&self) {
        if self.shutdown.is_cancelled() || self.is_running.swap(true, Ordering::SeqCst) {
            debug!("Session already started, skipping start");
            return;
        }

        info!(
            "Starting claim session (info every {:?}, status every {:?})",
            self.config.info_refresh_interval(),
            self.config.status_refresh_interval()
        );

        self.poller.spawn_info_loop(self.shutdown.clone());
        CountdownProjector::new(
            self.state.clone(),
            self.poller.subscribe_deadline(),
            self.config.countdown_tick(),
        )
        .spawn(self.shutdown.clone());
    }

    /// Apply a new address field value. A settled outcome is cleared; an in-flight claim is not.
    /// Returns `false` when the trimmed value did not change.
    pub async fn set_address(&self, raw: &str) -> bool {
        self.poller.track_address(raw, &self.shutdown).await
    }

    /// Attempt a claim for the current address
    pub async fn claim(&self) -> ClaimAttempt {
        self.orchestrator.claim().await
    }

    /// Out-of-cycle faucet info fetch
    pub async fn refresh_info(&self) -> bool {
        self.poller.refresh_info().await
    }

    /// Out-of-cycle status fetch for the current address
    pub async fn refresh_status(&self) -> bool {
        let address = self.state.read().await.address.clone();
        self.poller.refresh_status(&address).await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    /// Stop all timers. Late results of pending reads are discarded; an in-flight claim still settles.
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            debug!("Closing claim session");
            self.shutdown.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for ClaimSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
