//! HTTP client for the faucet API

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{
    ApiEnvelope, ClaimHistory, ClaimRequest, ClaimResponse, ClaimStatus, ErrorBody, FaucetInfo,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Default page size of `GET /history/{address}`
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Default page size of `GET /recent`
pub const DEFAULT_RECENT_LIMIT: u32 = 20;

/// Operations the faucet server exposes to the client
#[async_trait]
pub trait FaucetApi: Send + Sync {
    /// `GET /info`
    async fn get_faucet_info(&self) -> ClientResult<FaucetInfo>;

    /// `GET /check/{address}`
    async fn check_can_claim(&self, address: &str) -> ClientResult<ClaimStatus>;

    /// `POST /claim`
    async fn claim_tokens(&self, address: &str) -> ClientResult<ClaimResponse>;

    /// `GET /history/{address}?limit=N`
    async fn get_claim_history(&self, address: &str, limit: u32) -> ClientResult<Vec<ClaimHistory>>;

    /// `GET /recent?limit=N`
    async fn get_recent_claims(&self, limit: u32) -> ClientResult<Vec<ClaimHistory>>;
}

pub type SharedApi = Arc<dyn FaucetApi>;

/// reqwest-backed faucet API client
pub struct HttpFaucetApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFaucetApi {
    /// Create a client for the API base resolved from `config`
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("faucet-client/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.request_base(),
            client,
        })
    }

    /// Create a client for an explicit base URL (already including `/api/faucet`)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.message);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl FaucetApi for HttpFaucetApi {
    async fn get_faucet_info(&self) -> ClientResult<FaucetInfo> {
        let envelope: ApiEnvelope<FaucetInfo> = self.get_json("/info").await?;
        Ok(envelope.data)
    }

    async fn check_can_claim(&self, address: &str) -> ClientResult<ClaimStatus> {
        self.get_json(&format!("/check/{}", address)).await
    }

    async fn claim_tokens(&self, address: &str) -> ClientResult<ClaimResponse> {
        let url = self.url("/claim");
        debug!("POST {} address={}", url, address);
        let response = self
            .client
            .post(&url)
            .json(&ClaimRequest { address })
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get_claim_history(&self, address: &str, limit: u32) -> ClientResult<Vec<ClaimHistory>> {
        let envelope: ApiEnvelope<Vec<ClaimHistory>> = self
            .get_json(&format!("/history/{}?limit={}", address, limit))
            .await?;
        Ok(envelope.data)
    }

    async fn get_recent_claims(&self, limit: u32) -> ClientResult<Vec<ClaimHistory>> {
        let envelope: ApiEnvelope<Vec<ClaimHistory>> =
            self.get_json(&format!("/recent?limit={}", limit)).await?;
        Ok(envelope.data)
    }
}
