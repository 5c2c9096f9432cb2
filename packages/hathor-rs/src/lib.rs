// Thin client for the Hathor wallet-headless HTTP API
// https://github.com/HathorNetwork/hathor-wallet-headless

use std::time::{Duration, Instant};

pub mod models;
use reqwest::{header, Client};
use thiserror::Error;

use crate::models::{
    BalanceResponse, SendTxRequest, SendTxResponse, StartRequest, StartResponse, StatusResponse,
    WALLET_READY,
};

const WALLET_ID_HEADER: &str = "x-wallet-id";

#[derive(Error, Debug)]
pub enum HathorError {
    #[error("request to wallet failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("wallet returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("wallet failed to start: {0}")]
    StartFailed(String),

    #[error("wallet not ready after {0:?}")]
    NotReady(Duration),

    #[error("transaction rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct HathorOptions {
    pub base_url: String,
    pub wallet_id: String,
    pub seed_key: String,
    /// Upper bound for `start` to reach the ready state.
    pub connect_timeout: Duration,
    /// Applied to every individual HTTP request.
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HathorService {
    options: HathorOptions,
    client: Client,
}

impl HathorService {
    pub fn new(options: HathorOptions) -> Result<Self, HathorError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            WALLET_ID_HEADER,
            header::HeaderValue::from_str(&options.wallet_id)
                .map_err(|e| HathorError::StartFailed(format!("invalid wallet id: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.request_timeout)
            .connect_timeout(options.request_timeout)
            .build()?;

        Ok(Self { options, client })
    }

    pub fn wallet_id(&self) -> &str {
        &self.options.wallet_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url.trim_end_matches('/'), path)
    }

    /// Start the wallet and wait until it has synced with the network.
    pub async fn start(&self) -> Result<(), HathorError> {
        let res = self
            .client
            .post(self.url("/start"))
            .json(&StartRequest {
                wallet_id: &self.options.wallet_id,
                seed_key: &self.options.seed_key,
            })
            .send()
            .await?;

        let res = check_status(res).await?;
        let started = res.json::<StartResponse>().await?;
        if !started.success {
            let message = started.message.unwrap_or_default();
            // A second start for the same wallet id is harmless
            if !message.to_lowercase().contains("already") {
                return Err(HathorError::StartFailed(message));
            }
        }

        let deadline = Instant::now() + self.options.connect_timeout;
        loop {
            let status = self.status().await?;
            if status.status_code == WALLET_READY {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(HathorError::NotReady(self.options.connect_timeout));
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }

    pub async fn status(&self) -> Result<StatusResponse, HathorError> {
        let res = self.client.get(self.url("/wallet/status")).send().await?;
        Ok(check_status(res).await?.json::<StatusResponse>().await?)
    }

    /// Send `value` whole units of the native token to `address`.
    ///
    /// Returns the transaction hash.
    pub async fn send_tx(&self, address: &str, value: u64) -> Result<String, HathorError> {
        let res = self
            .client
            .post(self.url("/wallet/simple-send-tx"))
            .json(&SendTxRequest { address, value })
            .send()
            .await?;

        let sent = check_status(res).await?.json::<SendTxResponse>().await?;
        match (sent.success, sent.hash) {
            (true, Some(hash)) => Ok(hash),
            (true, None) => Err(HathorError::Rejected(
                "wallet reported success without a transaction hash".to_string(),
            )),
            (false, _) => Err(HathorError::Rejected(
                sent.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }

    pub async fn balance(&self) -> Result<BalanceResponse, HathorError> {
        let res = self.client.get(self.url("/wallet/balance")).send().await?;
        Ok(check_status(res).await?.json::<BalanceResponse>().await?)
    }
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, HathorError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(HathorError::Status {
        status: status.as_u16(),
        body,
    })
}
