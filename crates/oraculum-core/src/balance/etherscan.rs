//! ============================================================================
//! Etherscan Client - ETH balance via the block explorer account API
//! ============================================================================
//! GET {api_url}?module=account&action=balance&address=..&tag=latest&apikey=..
//! Response: {"status": "1"|"0", "message": "...", "result": "<wei>"}
//! ============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{BalanceSource, FetchError};
use crate::access::BalanceReading;
use crate::config::GateConfig;

/// Sepolia testnet endpoint
pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api-sepolia.etherscan.io/api";

/// Balance source backed by an Etherscan-compatible API
pub struct EtherscanClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl EtherscanClient {
    /// Create a client. A missing key is reported per request, not here.
    pub fn new(api_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &GateConfig) -> Result<Self> {
        Self::new(
            &config.api_url,
            config.api_key.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl BalanceSource for EtherscanClient {
    async fn fetch_balance(&self, address: &str) -> Result<BalanceReading, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;

        debug!("Fetching ETH balance for {} from {}", address, self.api_url);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("module", "account"),
                ("action", "balance"),
                ("address", address),
                ("tag", "latest"),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let wei = parse_balance_response(&body)?;
        debug!("Balance for {}: {} wei", address, wei);

        Ok(BalanceReading::from_wei(address, wei, Utc::now()))
    }
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Parse an account/balance response body into wei
pub fn parse_balance_response(body: &str) -> Result<u128, FetchError> {
    let response: BalanceResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if response.status != "1" {
        let result = match response.result {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        return Err(FetchError::Provider {
            message: response.message,
            result,
        });
    }

    match response.result {
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u128>()
            .map_err(|e| FetchError::Decode(format!("invalid wei amount '{}': {}", s, e))),
        other => Err(FetchError::Decode(format!(
            "expected wei string, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const ADDRESS: &str = "0x5036dbcEEfae0a7429e64467222e1E259819c7C7";

    /// Serve a single HTTP response and hand back the raw request head
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{}/api", addr), rx)
    }

    fn client(url: &str, key: Option<&str>) -> EtherscanClient {
        EtherscanClient::new(url, key.map(String::from), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_from_config() {
        let config = GateConfig {
            api_url: "http://localhost:9000/api".into(),
            api_key: Some("ABC123".into()),
            ..GateConfig::default()
        };
        let client = EtherscanClient::from_config(&config).unwrap();
        assert_eq!(client.api_url(), "http://localhost:9000/api");
        assert!(client.has_api_key());

        let keyless = EtherscanClient::from_config(&GateConfig::default()).unwrap();
        assert_eq!(keyless.api_url(), DEFAULT_ETHERSCAN_API_URL);
        assert!(!keyless.has_api_key());
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{"status":"1","message":"OK","result":"2000000000000000"}"#;
        assert_eq!(parse_balance_response(body), Ok(2_000_000_000_000_000));
    }

    #[test]
    fn test_parse_provider_error() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        assert_eq!(
            parse_balance_response(body),
            Err(FetchError::Provider {
                message: "NOTOK".into(),
                result: "Invalid API Key".into(),
            })
        );
    }

    #[test]
    fn test_parse_provider_error_without_result() {
        let body = r#"{"status":"0","message":"Max rate limit reached"}"#;
        match parse_balance_response(body) {
            Err(err @ FetchError::Provider { .. }) => {
                assert_eq!(err.to_string(), "Etherscan API error: Max rate limit reached");
                if let FetchError::Provider { message, result } = err {
                    assert_eq!(message, "Max rate limit reached");
                    assert!(result.is_empty());
                }
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_balance_response("<html>"), Err(FetchError::Decode(_))));
        assert!(matches!(
            parse_balance_response(r#"{"message":"OK"}"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            parse_balance_response(r#"{"status":"1","message":"OK","result":"12.5"}"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            parse_balance_response(r#"{"status":"1","message":"OK","result":42}"#),
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = client("http://127.0.0.1:1/api", None);
        assert!(!client.has_api_key());
        assert_eq!(client.fetch_balance(ADDRESS).await, Err(FetchError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = client("http://127.0.0.1:1/api", Some("KEY"));
        let result = client.fetch_balance(ADDRESS).await;
        assert!(matches!(result, Err(FetchError::Network(_))), "{:?}", result);
    }

    #[tokio::test]
    async fn test_fetch_balance_over_http() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"status":"1","message":"OK","result":"2000000000000000"}"#,
        )
        .await;

        let reading = client(&url, Some("KEY")).fetch_balance(ADDRESS).await.unwrap();
        assert_eq!(reading.wei, 2_000_000_000_000_000);
        assert_eq!(reading.amount, 0.002);
        assert_eq!(reading.address, ADDRESS);

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /api?"));
        assert!(head.contains("module=account"));
        assert!(head.contains("action=balance"));
        assert!(head.contains(&format!("address={}", ADDRESS)));
        assert!(head.contains("apikey=KEY"));
    }

    #[tokio::test]
    async fn test_http_error_status_is_network_error() {
        let (url, _request) = serve_once("500 Internal Server Error", "{}").await;
        let result = client(&url, Some("KEY")).fetch_balance(ADDRESS).await;
        assert_eq!(result, Err(FetchError::Network("HTTP 500 Internal Server Error".into())));
    }
}
