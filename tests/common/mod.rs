#![allow(dead_code)]

use fragment_stars::config::{AppConfig, MarketplaceConfig, PurchaseLimits, WalletDescriptor};
use fragment_stars::domain::credentials::Credentials;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

pub const HASH: &str = "ed3ec875a724358cea";

/// A request as received by [`MockMarketplace`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn form(&self) -> Vec<(String, String)> {
        let url = reqwest::Url::parse(&format!("http://form.local/?{}", self.body)).unwrap();
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.form()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Minimal HTTP/1.1 responder: answers each connection with the next scripted
/// `(status, body)` and records what it received.
pub struct MockMarketplace {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockMarketplace {
    pub async fn start(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let mut responses: Vec<(u16, String)> = responses
            .into_iter()
            .rev()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let (status, body) = responses
                    .pop()
                    .unwrap_or((404, r#"{"error":"unexpected"}"#.to_string()));
                if let Some(request) = read_request(&mut stream).await {
                    captured.lock().await.push(request);
                    respond(&mut stream, status, &body).await;
                }
            }
        });

        Self {
            base_url: format!("http://{}/api", addr),
            requests,
        }
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().await.clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = head_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[body_start..]).to_string();

    Some(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

async fn respond(stream: &mut TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}

pub fn credentials() -> Credentials {
    Credentials::new(HASH)
        .with_cookie("stel_ssid", "ssid-value")
        .with_cookie("stel_dt", "-240")
        .with_cookie("stel_ton_token", "ton-token")
        .with_cookie("stel_token", "token")
}

pub fn marketplace_config(base_url: &str) -> MarketplaceConfig {
    let wallet = WalletDescriptor {
        address: "0:20c429e3bb195f46a582c10eb687c6ed182ec58237a55787f245ec992c337118".to_string(),
        public_key: "91b296c356bb0894b40397b54565c11f4b29ea610b8e14d2ae1136a50c5d1d03"
            .to_string(),
        state_init: "te6cckECFgEAArEAAgE0AQsBFP8A9KQT9LzyyAsCAgEgAwYCAUgMBAIBIAgFABm+Xw9q"
            .to_string(),
        chain: "-239".to_string(),
    };
    let mut config = MarketplaceConfig::new(credentials(), wallet);
    config.base_url = base_url.to_string();
    config
}

pub fn app_config(base_url: &str) -> AppConfig {
    AppConfig {
        marketplace: marketplace_config(base_url),
        limits: PurchaseLimits::default(),
    }
}

pub fn encode(text: &str) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(text)
}

pub fn buy_link_body(address: &str, amount: &str, payload: &str) -> String {
    serde_json::json!({
        "ok": true,
        "transaction": {
            "validUntil": 1700000000,
            "messages": [{"address": address, "amount": amount, "payload": payload}]
        }
    })
    .to_string()
}
