//! Claim session state and its read-only snapshot

use crate::address::is_valid_address;
use crate::countdown::Countdown;
use crate::explorer;
use crate::types::{ClaimStatus, FaucetInfo};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Message shown when a claim is attempted with a malformed address
pub const INVALID_ADDRESS_MESSAGE: &str = "Please enter a valid Ethereum address";

/// Input hint while the address field holds a malformed value
pub const ADDRESS_HINT: &str = "Enter a valid EVM address (starts with 0x, 42 characters)";

/// Message shown when a claim could not be completed at all
pub const CLAIM_FAILED_MESSAGE: &str = "Claim failed, please try again later";

/// Why a claim attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed address, never sent to the server
    InvalidAddress,
    /// Server answered and refused the claim
    Rejected,
    /// No interpretable answer from the server
    Transport,
}

/// Terminal result of one claim attempt, attributed to the address it was sent for
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Success {
        address: String,
        amount: String,
        tx_hash: Option<String>,
        message: String,
    },
    Failure {
        address: String,
        kind: FailureKind,
        message: String,
    },
}

impl ClaimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClaimOutcome::Success { .. })
    }

    pub fn address(&self) -> &str {
        match self {
            ClaimOutcome::Success { address, .. } | ClaimOutcome::Failure { address, .. } => address,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClaimOutcome::Success { message, .. } | ClaimOutcome::Failure { message, .. } => message,
        }
    }

    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            ClaimOutcome::Success { tx_hash, .. } => tx_hash.as_deref(),
            ClaimOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ClaimOutcome::Success { .. } => None,
            ClaimOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Claim state machine: `Idle -> Submitting -> Settled`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ClaimPhase {
    #[default]
    Idle,
    Submitting { address: String },
    Settled(ClaimOutcome),
}

impl ClaimPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ClaimPhase::Submitting { .. })
    }

    pub fn outcome(&self) -> Option<&ClaimOutcome> {
        match self {
            ClaimPhase::Settled(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Mutable state of one claim session
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    /// Trimmed address text
    pub(crate) address: String,
    /// Bumped on every address change; stale status results carry an older value
    pub(crate) generation: u64,
    /// Sequence number of the last status request issued
    pub(crate) status_issued: u64,
    /// Sequence number of the status currently stored; older responses are dropped
    pub(crate) status_applied: u64,
    pub(crate) info: Option<FaucetInfo>,
    pub(crate) status: Option<ClaimStatus>,
    pub(crate) phase: ClaimPhase,
    pub(crate) countdown: Option<Countdown>,
}

pub(crate) type SharedState = Arc<RwLock<SessionState>>;

impl SessionState {
    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        let address_valid = is_valid_address(&self.address);

        let explorer_url = match (self.phase.outcome(), self.info.as_ref()) {
            (Some(outcome), Some(info)) if info.chain_id != 0 => outcome
                .tx_hash()
                .map(|hash| explorer::tx_url(hash, info.chain_id)),
            _ => None,
        };

        SessionSnapshot {
            address: self.address.clone(),
            address_valid,
            info: self.info.clone(),
            status: self.status.clone(),
            phase: self.phase.clone(),
            countdown: self.countdown.map(|countdown| countdown.to_string()),
            explorer_url,
        }
    }
}

/// Point-in-time copy of the session, safe to render
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub address: String,
    pub address_valid: bool,
    pub info: Option<FaucetInfo>,
    pub status: Option<ClaimStatus>,
    pub phase: ClaimPhase,
    pub countdown: Option<String>,
    /// Explorer link of the last successful claim's transaction
    pub explorer_url: Option<String>,
}

impl SessionSnapshot {
    pub fn in_flight(&self) -> bool {
        self.phase.is_in_flight()
    }

    pub fn outcome(&self) -> Option<&ClaimOutcome> {
        self.phase.outcome()
    }

    /// Whether the claim action should be enabled
    pub fn can_submit(&self) -> bool {
        self.address_valid
            && !self.in_flight()
            && self.status.as_ref().map_or(false, |status| status.can_claim)
    }

    /// Hint for a non-empty, malformed address
    pub fn address_hint(&self) -> Option<&'static str> {
        if !self.address.is_empty() && !self.address_valid {
            Some(ADDRESS_HINT)
        } else {
            None
        }
    }

    /// Cooldown notice while the address is not eligible
    pub fn cooldown_notice(&self) -> Option<String> {
        match (&self.status, &self.countdown) {
            (Some(status), Some(countdown)) if !status.can_claim => Some(format!(
                "This address has claimed from this faucet. Please try again in {}.",
                countdown
            )),
            _ => None,
        }
    }

    /// Faucet health label
    pub fn faucet_health(&self) -> Option<&'static str> {
        self.info.as_ref().map(|info| {
            if info.is_funded() {
                "Online"
            } else {
                "Needs refill"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_info, VALID_ADDRESS};

    fn success(address: &str) -> ClaimOutcome {
        ClaimOutcome::Success {
            address: address.to_string(),
            amount: "10".to_string(),
            tx_hash: Some("0xdead".to_string()),
            message: "You received 10 USDC on X Layer Testnet.".to_string(),
        }
    }

    #[test]
    fn test_explorer_link_needs_hash_and_chain() {
        let mut state = SessionState {
            address: VALID_ADDRESS.to_string(),
            phase: ClaimPhase::Settled(success(VALID_ADDRESS)),
            ..Default::default()
        };
        assert_eq!(state.snapshot().explorer_url, None);

        state.info = Some(sample_info());
        assert_eq!(
            state.snapshot().explorer_url.as_deref(),
            Some("https://web3.okx.com/explorer/x-layer-testnet/tx/0xdead")
        );

        state.phase = ClaimPhase::Settled(ClaimOutcome::Failure {
            address: VALID_ADDRESS.to_string(),
            kind: FailureKind::Rejected,
            message: "Faucet balance too low".to_string(),
        });
        assert_eq!(state.snapshot().explorer_url, None);
    }

    #[test]
    fn test_can_submit_requires_valid_eligible_idle_address() {
        let mut state = SessionState {
            address: VALID_ADDRESS.to_string(),
            status: Some(ClaimStatus {
                can_claim: true,
                next_claim_time: None,
            }),
            ..Default::default()
        };
        assert!(state.snapshot().can_submit());

        state.phase = ClaimPhase::Submitting {
            address: VALID_ADDRESS.to_string(),
        };
        assert!(!state.snapshot().can_submit());

        state.phase = ClaimPhase::Idle;
        state.status = None;
        assert!(!state.snapshot().can_submit());

        state.address = "0x123".to_string();
        let snapshot = state.snapshot();
        assert!(!snapshot.can_submit());
        assert_eq!(snapshot.address_hint(), Some(ADDRESS_HINT));
    }

    #[test]
    fn test_cooldown_notice() {
        let state = SessionState {
            address: VALID_ADDRESS.to_string(),
            status: Some(ClaimStatus {
                can_claim: false,
                next_claim_time: Some("2026-01-01T00:00:00Z".to_string()),
            }),
            countdown: Some(Countdown::Remaining { hours: 2, minutes: 5 }),
            ..Default::default()
        };
        assert_eq!(
            state.snapshot().cooldown_notice().as_deref(),
            Some("This address has claimed from this faucet. Please try again in 2h 5m.")
        );
    }

    #[test]
    fn test_faucet_health() {
        let mut state = SessionState::default();
        assert_eq!(state.snapshot().faucet_health(), None);

        let mut info = sample_info();
        state.info = Some(info.clone());
        assert_eq!(state.snapshot().faucet_health(), Some("Online"));

        info.token_balance = "0.00".to_string();
        state.info = Some(info);
        assert_eq!(state.snapshot().faucet_health(), Some("Needs refill"));
    }
}
