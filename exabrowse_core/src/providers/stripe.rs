use super::{PaymentIntentRequest, PaymentProvider};
use crate::config::HttpSettings;
use crate::credentials::{resolve_api_key, CredentialStore};
use crate::error::{BrowseError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const STRIPE_BASE_URL: &str = "https://api.stripe.com/v1";

pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, http: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| BrowseError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            secret_key: secret_key.into(),
            base_url: STRIPE_BASE_URL.to_string(),
        })
    }

    pub fn from_store(store: &dyn CredentialStore, http: &HttpSettings) -> Result<Self> {
        let key = resolve_api_key(store, "stripe")
            .ok_or_else(|| BrowseError::Configuration("STRIPE_SECRET_KEY not configured".into()))?;
        Self::new(key, http)
    }
}

/// Form fields for `POST /payment_intents`.
pub fn payment_intent_form(request: &PaymentIntentRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), request.amount_cents.to_string()),
        ("currency".to_string(), request.currency.clone()),
        ("description".to_string(), request.description.clone()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }
    form
}

#[async_trait]
impl PaymentProvider for StripeClient {
    fn name(&self) -> &'static str {
        "Stripe"
    }

    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<String> {
        let resp = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&payment_intent_form(request))
            .send()
            .await
            .map_err(BrowseError::HttpRequest)?;

        let status = resp.status();
        let value: Value = resp.json().await.map_err(BrowseError::HttpRequest)?;
        if !status.is_success() {
            let message = value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(BrowseError::provider(
                "Stripe",
                format!("{} - {}", status.as_u16(), message),
            ));
        }

        value
            .get("client_secret")
            .and_then(|s| s.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| BrowseError::provider("Stripe", "response missing client_secret"))
    }
}
