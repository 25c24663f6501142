//! Request and response types of the faucet HTTP API

use crate::format::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token amount as sent by the server: a JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenAmount {
    Number(f64),
    Text(String),
}

impl From<&str> for TokenAmount {
    fn from(value: &str) -> Self {
        TokenAmount::Text(value.to_string())
    }
}

/// Faucet-wide information, independent of any address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetInfo {
    /// Faucet account identifier
    pub faucet_address: String,
    /// Token symbol, e.g. `USDC`
    pub token_symbol: String,
    /// Token icon reference
    #[serde(default)]
    pub token_logo: Option<String>,
    /// Amount dispensed per claim
    pub amount_per_claim: TokenAmount,
    /// Current token balance held by the faucet (decimal string)
    pub token_balance: String,
    /// Claim interval description, e.g. `24 hours`
    pub claim_interval: String,
    /// Network chain identifier
    pub chain_id: u64,
}

impl FaucetInfo {
    /// Parsed faucet balance, `None` when the server sent something non-numeric
    pub fn balance(&self) -> Option<f64> {
        self.token_balance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|balance| balance.is_finite())
    }

    /// Whether the faucet still holds tokens to dispense
    pub fn is_funded(&self) -> bool {
        self.balance().map_or(false, |balance| balance > 0.0)
    }
}

/// Claim eligibility of one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatus {
    pub can_claim: bool,
    /// ISO-8601 time of the next allowed claim while a cooldown is active
    #[serde(default)]
    pub next_claim_time: Option<String>,
}

impl ClaimStatus {
    /// Parsed next-claim time; absent or unparseable values yield `None`
    pub fn next_claim_at(&self) -> Option<DateTime<Utc>> {
        self.next_claim_time.as_deref().and_then(parse_timestamp)
    }
}

/// Claim request body
#[derive(Debug, Clone, Serialize)]
pub struct ClaimRequest<'a> {
    pub address: &'a str,
}

/// Result of a claim request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub success: bool,
    #[serde(default)]
    pub amount: Option<TokenAmount>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ClaimResponse {
    /// Amount actually dispensed, falling back to the faucet's per-claim amount
    pub fn dispensed_amount<'a>(&'a self, info: Option<&'a FaucetInfo>) -> Option<&'a TokenAmount> {
        self.amount
            .as_ref()
            .or_else(|| info.map(|info| &info.amount_per_claim))
    }

    /// Transaction hash, ignoring empty strings
    pub fn transaction_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref().filter(|hash| !hash.is_empty())
    }
}

/// One past claim as listed by the history endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimHistory {
    pub address: String,
    pub amount: TokenAmount,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default, alias = "timestamp", alias = "claimedAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `{ success, data }` wrapper used by the info and history endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
}

/// Body of a non-2xx response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
