//! Periodic synchronization of faucet info and per-address eligibility

use crate::address::{is_valid_address, normalize_address};
use crate::api::SharedApi;
use crate::config::ClientConfig;
use crate::state::{ClaimPhase, SharedState};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Keeps the session's `FaucetInfo` and `ClaimStatus` fresh
pub struct StatusPoller {
    api: SharedApi,
    state: SharedState,
    /// Active next-claim deadline, consumed by the countdown projector
    deadline: watch::Sender<Option<DateTime<Utc>>>,
    info_interval: Duration,
    status_interval: Duration,
    /// Cancels the per-address poll loop of the current address
    status_task: Mutex<Option<CancellationToken>>,
}

impl StatusPoller {
    pub(crate) fn new(api: SharedApi, state: SharedState, config: &ClientConfig) -> Self {
        let (deadline, _) = watch::channel(None);
        Self {
            api,
            state,
            deadline,
            info_interval: config.info_refresh_interval(),
            status_interval: config.status_refresh_interval(),
            status_task: Mutex::new(None),
        }
    }

    pub(crate) fn subscribe_deadline(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.deadline.subscribe()
    }

    /// Fetch faucet info. On failure the previous snapshot is kept.
    pub async fn refresh_info(&self) -> bool {
        match self.api.get_faucet_info().await {
            Ok(info) => {
                self.state.write().await.info = Some(info);
                true
            }
            Err(e) => {
                warn!("Load faucet info error: {}", e);
                false
            }
        }
    }

    /// Fetch eligibility for `address` if it is valid and still the session's address.
    /// Results are dropped when the address changed while the request was in flight,
    /// or when a later-issued request has already been applied.
    pub async fn refresh_status(&self, address: &str) -> bool {
        if !is_valid_address(address) {
            return false;
        }

        let (generation, seq) = {
            let mut state = self.state.write().await;
            if state.address != address {
                debug!("Skipping status fetch for inactive address {}", address);
                return false;
            }
            state.status_issued += 1;
            (state.generation, state.status_issued)
        };

        match self.api.check_can_claim(address).await {
            Ok(status) => {
                let mut state = self.state.write().await;
                if state.generation != generation || state.address != address {
                    debug!("Discarding superseded status for {}", address);
                    return false;
                }
                if seq <= state.status_applied {
                    debug!("Discarding out-of-order status #{} for {}", seq, address);
                    return false;
                }

                self.publish_deadline(status.next_claim_at());
                state.status = Some(status);
                state.status_applied = seq;
                true
            }
            Err(e) => {
                warn!("Check claim status error for {}: {}", address, e);
                false
            }
        }
    }

    /// Switch the tracked address. Clears the old status, stops the old poll loop
    /// and, for a valid address, starts a new one with an immediate fetch.
    /// A settled claim outcome is cleared in the same critical section.
    /// Returns `false` when the normalized address is unchanged.
    pub(crate) async fn track_address(self: &Arc<Self>, raw: &str, shutdown: &CancellationToken) -> bool {
        let address = normalize_address(raw).to_string();
        let mut task = self.status_task.lock().await;

        {
            let mut state = self.state.write().await;
            if state.address == address {
                return false;
            }
            state.address = address.clone();
            state.generation = state.generation.wrapping_add(1);
            state.status = None;
            state.countdown = None;
            // An in-flight claim keeps running and settles later
            if matches!(state.phase, ClaimPhase::Settled(_)) {
                state.phase = ClaimPhase::Idle;
            }
            self.publish_deadline(None);
        }

        if let Some(previous) = task.take() {
            previous.cancel();
        }

        if is_valid_address(&address) && !shutdown.is_cancelled() {
            let token = shutdown.child_token();
            self.spawn_status_loop(address, token.clone());
            *task = Some(token);
        } else {
            debug!("Status polling halted");
        }

        true
    }

    pub(crate) fn spawn_info_loop(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            debug!("Starting faucet info refresh every {:?}", poller.info_interval);
            let mut interval = tokio::time::interval(poller.info_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = poller.refresh_info() => {}
                }
            }
            debug!("Faucet info refresh stopped");
        })
    }

    fn spawn_status_loop(self: &Arc<Self>, address: String, token: CancellationToken) {
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            debug!("Starting status polling for {}", address);
            // First tick completes immediately
            let mut interval = tokio::time::interval(poller.status_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = poller.refresh_status(&address) => {}
                }
            }
            debug!("Status polling for {} stopped", address);
        });
    }

    fn publish_deadline(&self, deadline: Option<DateTime<Utc>>) {
        self.deadline.send_if_modified(|current| {
            if *current == deadline {
                false
            } else {
                *current = deadline;
                true
            }
        });
    }
}
