//! In-memory faucet API for session tests

use crate::api::FaucetApi;
use crate::error::{ClientError, ClientResult};
use crate::types::{ClaimHistory, ClaimResponse, ClaimStatus, FaucetInfo, TokenAmount};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const VALID_ADDRESS: &str = "0xABCDEF0123456789abcdef0123456789ABCDEF01";
pub(crate) const OTHER_ADDRESS: &str = "0x2222222222222222222222222222222222222222";

pub(crate) fn sample_info() -> FaucetInfo {
    FaucetInfo {
        faucet_address: "0x1111111111111111111111111111111111111111".to_string(),
        token_symbol: "USDC".to_string(),
        token_logo: None,
        amount_per_claim: TokenAmount::from("100"),
        token_balance: "2500".to_string(),
        claim_interval: "24 hours".to_string(),
        chain_id: 195,
    }
}

pub(crate) fn eligible() -> ClaimStatus {
    ClaimStatus {
        can_claim: true,
        next_claim_time: None,
    }
}

pub(crate) fn cooling_down(next_claim_time: &str) -> ClaimStatus {
    ClaimStatus {
        can_claim: false,
        next_claim_time: Some(next_claim_time.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Info,
    Check(String),
    Claim(String),
    History(String, u32),
    Recent(u32),
}

#[derive(Debug, Clone)]
pub(crate) enum ClaimReply {
    Response(ClaimResponse),
    ServerError(u16, Option<String>),
    Unreachable,
}

/// Scripted responses; a missing entry makes the call fail
#[derive(Default)]
pub(crate) struct FakeApi {
    info: Mutex<Option<FaucetInfo>>,
    statuses: Mutex<HashMap<String, ClaimStatus>>,
    status_delays: Mutex<HashMap<String, Duration>>,
    claim_reply: Mutex<Option<ClaimReply>>,
    claim_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_info(&self, info: Option<FaucetInfo>) {
        *self.info.lock().unwrap() = info;
    }

    pub(crate) fn set_status(&self, address: &str, status: ClaimStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(address.to_string(), status);
    }

    pub(crate) fn remove_status(&self, address: &str) {
        self.statuses.lock().unwrap().remove(address);
    }

    pub(crate) fn delay_status(&self, address: &str, delay: Duration) {
        self.status_delays
            .lock()
            .unwrap()
            .insert(address.to_string(), delay);
    }

    pub(crate) fn clear_status_delay(&self, address: &str) {
        self.status_delays.lock().unwrap().remove(address);
    }

    pub(crate) fn set_claim_reply(&self, reply: ClaimReply) {
        *self.claim_reply.lock().unwrap() = Some(reply);
    }

    pub(crate) fn delay_claim(&self, delay: Duration) {
        *self.claim_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub(crate) fn claim_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Claim(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FaucetApi for FakeApi {
    async fn get_faucet_info(&self) -> ClientResult<FaucetInfo> {
        self.record(Call::Info);
        let info = self.info.lock().unwrap().clone();
        info.ok_or_else(|| ClientError::InvalidResponse("info unavailable".to_string()))
    }

    async fn check_can_claim(&self, address: &str) -> ClientResult<ClaimStatus> {
        self.record(Call::Check(address.to_string()));
        // Answered with the status as of the request; the delay only holds the reply back
        let status = self.statuses.lock().unwrap().get(address).cloned();
        let delay = self.status_delays.lock().unwrap().get(address).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        status.ok_or_else(|| ClientError::Server {
            status: 503,
            message: None,
        })
    }

    async fn claim_tokens(&self, address: &str) -> ClientResult<ClaimResponse> {
        self.record(Call::Claim(address.to_string()));
        let delay = *self.claim_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.claim_reply.lock().unwrap().clone();
        match reply {
            Some(ClaimReply::Response(response)) => Ok(response),
            Some(ClaimReply::ServerError(status, message)) => {
                Err(ClientError::Server { status, message })
            }
            Some(ClaimReply::Unreachable) | None => Err(ClientError::InvalidResponse(
                "connection reset".to_string(),
            )),
        }
    }

    async fn get_claim_history(&self, address: &str, limit: u32) -> ClientResult<Vec<ClaimHistory>> {
        self.record(Call::History(address.to_string(), limit));
        Ok(Vec::new())
    }

    async fn get_recent_claims(&self, limit: u32) -> ClientResult<Vec<ClaimHistory>> {
        self.record(Call::Recent(limit));
        Ok(Vec::new())
    }
}

/// Let spawned tasks run; with a paused clock this also advances past `ms`
pub(crate) async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
