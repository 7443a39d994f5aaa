//! HTTP gateway to a remote ledger peer
//!
//! Invocations are posted as JSON to
//! `{base}/channels/{channel}/chaincodes/{chaincode}/{submit|evaluate}`.
//! A 2xx body is the ledger program's result. A 4xx body carrying a
//! `ContractError` is a domain rejection; anything else is the peer being
//! unavailable. Connections are not pooled between calls.

use std::time::Duration;

use async_trait::async_trait;
use olivechain_integrity::{ContractError, Invocation};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::LedgerGateway;

/// Header carrying the caller identity forwarded to the peer
pub const IDENTITY_HEADER: &str = "x-ledger-identity";

/// Remote peer settings
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub channel: String,
    pub chaincode: String,
    pub identity: Option<String>,
    pub timeout: Duration,
}

pub struct HttpGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpGateway {
    pub fn new(config: HttpGatewayConfig) -> GatewayResult<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref identity) = config.identity {
            let value = header::HeaderValue::from_str(identity)
                .map_err(|e| GatewayError::Unavailable(format!("invalid identity: {}", e)))?;
            headers.insert(IDENTITY_HEADER, value);
        }

        // No idle connections are kept: every call opens and releases its own
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/channels/{}/chaincodes/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.channel),
            urlencoding::encode(&self.config.chaincode),
            action
        )
    }

    async fn post(&self, action: &str, invocation: &Invocation) -> GatewayResult<Value> {
        let url = self.endpoint(action);
        let request_id = Uuid::new_v4();
        debug!(%request_id, function = invocation.function(), url = %url, "Remote ledger call");

        let response = self
            .client
            .post(&url)
            .header("x-request-id", request_id.to_string())
            .json(invocation)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> GatewayResult<Value> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            if let Ok(rejection) = serde_json::from_str::<ContractError>(&body) {
                return Err(GatewayError::Contract(rejection));
            }
        }
        Err(GatewayError::Unavailable(format!(
            "peer returned {}: {}",
            status.as_u16(),
            body
        )))
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.config.timeout)
        } else {
            GatewayError::from(err)
        }
    }
}

#[async_trait]
impl LedgerGateway for HttpGateway {
    async fn connect(&self) -> GatewayResult<()> {
        let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                info!(peer = %self.describe(), "Connected to remote ledger peer");
                Ok(())
            }
            other => Err(GatewayError::Unavailable(format!(
                "health check returned {}",
                other.as_u16()
            ))),
        }
    }

    async fn submit(&self, invocation: &Invocation) -> GatewayResult<Value> {
        self.post("submit", invocation).await
    }

    async fn evaluate(&self, invocation: &Invocation) -> GatewayResult<Value> {
        self.post("evaluate", invocation).await
    }

    async fn close(&self) {}

    fn describe(&self) -> String {
        format!(
            "remote:{} ({}/{})",
            self.config.base_url, self.config.channel, self.config.chaincode
        )
    }
}
