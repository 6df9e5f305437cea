use crate::config::{FailureMode, MarketplaceConfig};
use crate::domain::ports::MarketplaceGateway;
use crate::domain::purchase::TransactionDescriptor;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const WALLET_FEATURES: &str =
    r#"["SendTransaction",{"name":"SendTransaction","maxMessages":255}]"#;

/// Recipient details returned by `searchStarsRecipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientProfile {
    pub username: String,
    pub recipient: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

/// HTTP adapter for the Fragment purchase API.
///
/// Every call is a single form-encoded POST to the hashed endpoint with the
/// session cookies attached. No retries.
pub struct FragmentClient {
    client: Client,
    endpoint: String,
    config: MarketplaceConfig,
}

impl FragmentClient {
    pub fn new(config: MarketplaceConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            config,
        })
    }

    /// `referer` is set only for the buy-link call, which also needs the
    /// browser-style headers the marketplace checks.
    async fn post(&self, form: &[(&str, &str)], referer: Option<&str>) -> Result<Value> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(COOKIE, self.config.credentials.cookie_header());

        if let Some(referer) = referer {
            let profile = &self.config.client;
            request = request
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(ORIGIN, profile.origin.as_str())
                .header(REFERER, referer);
            if let Some(agent) = &profile.user_agent {
                request = request
                    .header(USER_AGENT, agent.as_str())
                    .header("X-Requested-With", "XMLHttpRequest");
            }
        }

        let response = request.form(form).send().await?.error_for_status()?;
        let body: Value = response.json().await?;
        debug!(%body, "marketplace response");
        Ok(body)
    }

    fn degrade<T>(&self, method: &str, error: PurchaseError, sentinel: T) -> Result<T> {
        match self.config.failure_mode {
            FailureMode::Collapse => {
                warn!(method, %error, "marketplace call failed");
                Ok(sentinel)
            }
            FailureMode::Distinct => {
                Err(PurchaseError::Transport(format!("{}: {}", method, error)))
            }
        }
    }

    async fn search(&self, username: &str) -> Result<Value> {
        let query = normalize_username(username);
        self.post(&[("query", query), ("method", "searchStarsRecipient")], None)
            .await
    }

    /// Looks up the recipient and the display details the marketplace shows for it.
    pub async fn fetch_recipient_profile(
        &self,
        username: &str,
    ) -> Result<Option<RecipientProfile>> {
        let body = match self.search(username).await {
            Ok(body) => body,
            Err(e) => return self.degrade("searchStarsRecipient", e, None),
        };

        let Some(found) = body.get("found").filter(|f| f.is_object()) else {
            return Ok(None);
        };
        let Some(recipient) = found.get("recipient").and_then(as_text) else {
            return Ok(None);
        };

        Ok(Some(RecipientProfile {
            username: normalize_username(username).to_string(),
            recipient,
            name: found.get("name").and_then(as_text),
            photo_url: found
                .get("photo")
                .and_then(Value::as_str)
                .and_then(extract_photo_url),
        }))
    }
}

#[async_trait]
impl MarketplaceGateway for FragmentClient {
    async fn search_recipient(&self, username: &str) -> Result<String> {
        match self.search(username).await {
            Ok(body) => Ok(body
                .pointer("/found/recipient")
                .and_then(as_text)
                .unwrap_or_default()),
            Err(e) => self.degrade("searchStarsRecipient", e, String::new()),
        }
    }

    async fn create_purchase_request(&self, recipient: &str, quantity: u32) -> Result<String> {
        let quantity = quantity.to_string();
        let form = [
            ("recipient", recipient),
            ("quantity", quantity.as_str()),
            ("method", "initBuyStarsRequest"),
        ];
        match self.post(&form, None).await {
            Ok(body) => Ok(body.get("req_id").and_then(as_text).unwrap_or_default()),
            Err(e) => self.degrade("initBuyStarsRequest", e, String::new()),
        }
    }

    async fn fetch_transaction_descriptor(
        &self,
        recipient: &str,
        request_id: &str,
        quantity: u32,
    ) -> Result<TransactionDescriptor> {
        let wallet = &self.config.wallet;
        let profile = &self.config.client;
        let protocol_version = profile.max_protocol_version.to_string();
        let form = [
            ("address", wallet.address.as_str()),
            ("chain", wallet.chain.as_str()),
            ("walletStateInit", wallet.state_init.as_str()),
            ("publicKey", wallet.public_key.as_str()),
            ("features", WALLET_FEATURES),
            ("maxProtocolVersion", protocol_version.as_str()),
            ("platform", profile.platform.as_str()),
            ("appName", profile.app_name.as_str()),
            ("appVersion", profile.app_version.as_str()),
            ("transaction", "1"),
            ("id", request_id),
            ("show_sender", "0"),
            ("method", "getBuyStarsLink"),
        ];
        let referer = format!(
            "{}/stars/buy?recipient={}&quantity={}",
            profile.origin, recipient, quantity
        );

        match self.post(&form, Some(&referer)).await {
            Ok(body) => {
                let descriptor = parse_descriptor(&body);
                if descriptor.is_complete() {
                    info!(request_id, "transaction descriptor received");
                }
                Ok(descriptor)
            }
            Err(e) => self.degrade("getBuyStarsLink", e, TransactionDescriptor::default()),
        }
    }
}

fn normalize_username(username: &str) -> &str {
    username.trim_start_matches('@')
}

/// Strings as-is, numbers in their decimal form.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_descriptor(body: &Value) -> TransactionDescriptor {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        return TransactionDescriptor::default();
    }
    let Some(message) = body
        .pointer("/transaction/messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.first())
    else {
        return TransactionDescriptor::default();
    };

    let field = |name: &str| message.get(name).and_then(as_text);
    match (field("address"), field("amount"), field("payload")) {
        (Some(address), Some(amount), Some(payload)) => {
            TransactionDescriptor::new(address, amount, payload)
        }
        _ => TransactionDescriptor::default(),
    }
}

/// Pulls the URL out of an `<img src="...">` snippet.
fn extract_photo_url(html: &str) -> Option<String> {
    let start = html.find("src=\"")? + 5;
    let end = start + html[start..].find('"')?;
    (end > start).then(|| html[start..end].to_string())
}
