//! Client for a rate-limited testnet token faucet
//!
//! The client keeps a claim session for one user-entered address:
//! - Address validation
//! - Periodic faucet info and eligibility polling
//! - Cooldown countdown
//! - Claim submission with an explicit `Idle -> Submitting -> Settled` state machine

pub mod address;
pub mod api;
pub mod config;
pub mod countdown;
pub mod error;
pub mod explorer;
pub mod format;
pub mod orchestrator;
pub mod poller;
pub mod session;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use address::{is_valid_address, normalize_address, short_address};
pub use api::{FaucetApi, HttpFaucetApi, SharedApi, DEFAULT_HISTORY_LIMIT, DEFAULT_RECENT_LIMIT};
pub use config::ClientConfig;
pub use countdown::{project, project_until, Countdown};
pub use error::{ClientError, ClientResult};
pub use orchestrator::{ClaimAttempt, ClaimOrchestrator, SkipReason};
pub use poller::StatusPoller;
pub use session::ClaimSession;
pub use state::{ClaimOutcome, ClaimPhase, FailureKind, SessionSnapshot};
pub use types::{ClaimHistory, ClaimResponse, ClaimStatus, FaucetInfo, TokenAmount};
