use serde::{Deserialize, Serialize};

/// Wallet-headless reports this status code once the wallet has synced.
pub const WALLET_READY: i64 = 3;

#[derive(Debug, Serialize)]
pub struct StartRequest<'a> {
    #[serde(rename = "wallet-id")]
    pub wallet_id: &'a str,
    #[serde(rename = "seedKey")]
    pub seed_key: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendTxRequest<'a> {
    pub address: &'a str,
    pub value: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    #[serde(rename = "statusMessage", default)]
    pub status_message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendTxResponse {
    pub success: bool,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub available: u64,
    #[serde(default)]
    pub locked: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_uses_wallet_headless_field_names() {
        let body = serde_json::to_value(StartRequest {
            wallet_id: "tipbot",
            seed_key: "default",
        })
        .unwrap();

        assert_eq!(body["wallet-id"], "tipbot");
        assert_eq!(body["seedKey"], "default");
    }

    #[test]
    fn failed_send_carries_error() {
        let resp: SendTxResponse =
            serde_json::from_str(r#"{"success":false,"error":"Insufficient amount of tokens"}"#)
                .unwrap();

        assert!(!resp.success);
        assert!(resp.hash.is_none());
        assert_eq!(resp.error.as_deref(), Some("Insufficient amount of tokens"));
    }

    #[test]
    fn status_parses_ready_wallet() {
        let resp: StatusResponse =
            serde_json::from_str(r#"{"statusCode":3,"statusMessage":"Ready","network":"testnet"}"#)
                .unwrap();

        assert_eq!(resp.status_code, WALLET_READY);
        assert_eq!(resp.status_message, "Ready");
    }
}
