//! One-shot claim flow: guard, submit, interpret, re-sync

use crate::address::is_valid_address;
use crate::api::SharedApi;
use crate::error::ClientResult;
use crate::format::format_token_amount;
use crate::poller::StatusPoller;
use crate::state::{
    ClaimOutcome, ClaimPhase, FailureKind, SharedState, CLAIM_FAILED_MESSAGE,
    INVALID_ADDRESS_MESSAGE,
};
use crate::types::{ClaimResponse, FaucetInfo};
use std::sync::Arc;
use tracing::{info, warn};

/// Why a claim attempt did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Latest known status does not allow a claim
    NotEligible,
    /// Another claim is still in flight
    InFlight,
}

/// Result of `ClaimOrchestrator::claim`
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimAttempt {
    Skipped(SkipReason),
    Settled(ClaimOutcome),
}

/// Wording of success messages
#[derive(Debug, Clone)]
pub(crate) struct ClaimMessages {
    pub(crate) network_name: String,
    pub(crate) default_token_symbol: String,
}

#[derive(Clone)]
pub struct ClaimOrchestrator {
    api: SharedApi,
    state: SharedState,
    poller: Arc<StatusPoller>,
    messages: Arc<ClaimMessages>,
}

impl ClaimOrchestrator {
    pub(crate) fn new(
        api: SharedApi,
        state: SharedState,
        poller: Arc<StatusPoller>,
        messages: ClaimMessages,
    ) -> Self {
        Self {
            api,
            state,
            poller,
            messages: Arc::new(messages),
        }
    }

    /// Attempt a claim for the session's current address.
    ///
    /// The guard runs against the in-memory state at call time and never touches the
    /// network. Once submitted, the request runs to completion on its own task even if
    /// the caller stops waiting, so the session always leaves `Submitting`.
    pub async fn claim(&self) -> ClaimAttempt {
        let address = {
            let mut state = self.state.write().await;

            if state.phase.is_in_flight() {
                return ClaimAttempt::Skipped(SkipReason::InFlight);
            }

            let address = state.address.clone();
            if !is_valid_address(&address) {
                let outcome = ClaimOutcome::Failure {
                    address,
                    kind: FailureKind::InvalidAddress,
                    message: INVALID_ADDRESS_MESSAGE.to_string(),
                };
                state.phase = ClaimPhase::Settled(outcome.clone());
                return ClaimAttempt::Settled(outcome);
            }

            if !state.status.as_ref().map_or(false, |status| status.can_claim) {
                return ClaimAttempt::Skipped(SkipReason::NotEligible);
            }

            state.phase = ClaimPhase::Submitting {
                address: address.clone(),
            };
            address
        };

        info!("Submitting claim for {}", address);

        let orchestrator = self.clone();
        let submitted = address.clone();
        let handle = tokio::spawn(async move { orchestrator.submit(submitted).await });

        match handle.await {
            Ok(outcome) => ClaimAttempt::Settled(outcome),
            Err(e) => {
                warn!("Claim task for {} aborted: {}", address, e);
                let outcome = ClaimOutcome::Failure {
                    address,
                    kind: FailureKind::Transport,
                    message: CLAIM_FAILED_MESSAGE.to_string(),
                };
                self.settle(outcome.clone()).await;
                ClaimAttempt::Settled(outcome)
            }
        }
    }

    async fn submit(&self, address: String) -> ClaimOutcome {
        let result = self.api.claim_tokens(&address).await;

        let outcome = {
            let state = self.state.read().await;
            interpret_claim(&address, result, state.info.as_ref(), &self.messages)
        };
        self.settle(outcome.clone()).await;

        match &outcome {
            ClaimOutcome::Success { tx_hash, .. } => {
                info!("Claim for {} succeeded, tx: {:?}", address, tx_hash);
                tokio::join!(self.poller.refresh_status(&address), self.poller.refresh_info());
            }
            ClaimOutcome::Failure { kind, message, .. } => {
                info!("Claim for {} failed ({:?}): {}", address, kind, message);
            }
        }

        outcome
    }

    async fn settle(&self, outcome: ClaimOutcome) {
        self.state.write().await.phase = ClaimPhase::Settled(outcome);
    }
}

/// Turn the claim request result into a terminal outcome
pub(crate) fn interpret_claim(
    address: &str,
    result: ClientResult<ClaimResponse>,
    info: Option<&FaucetInfo>,
    messages: &ClaimMessages,
) -> ClaimOutcome {
    match result {
        Ok(response) if response.success => {
            let amount = format_token_amount(response.dispensed_amount(info));
            let symbol = info
                .map(|info| info.token_symbol.as_str())
                .filter(|symbol| !symbol.is_empty())
                .unwrap_or(&messages.default_token_symbol);

            ClaimOutcome::Success {
                address: address.to_string(),
                message: format!(
                    "You received {} {} on {}.",
                    amount, symbol, messages.network_name
                ),
                amount,
                tx_hash: response.transaction_hash().map(str::to_string),
            }
        }
        Ok(response) => ClaimOutcome::Failure {
            address: address.to_string(),
            kind: FailureKind::Rejected,
            message: response
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| CLAIM_FAILED_MESSAGE.to_string()),
        },
        Err(e) => match e.server_message() {
            Some(message) => ClaimOutcome::Failure {
                address: address.to_string(),
                kind: FailureKind::Rejected,
                message: message.to_string(),
            },
            None => {
                warn!("Claim request for {} failed: {}", address, e);
                ClaimOutcome::Failure {
                    address: address.to_string(),
                    kind: FailureKind::Transport,
                    message: CLAIM_FAILED_MESSAGE.to_string(),
                }
            }
        },
    }
}
