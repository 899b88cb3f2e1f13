//! One-off donations through a payment provider.

use crate::error::{BrowseError, Result};
use crate::providers::{PaymentIntentRequest, PaymentProvider};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const MIN_DONATION_CENTS: u64 = 100;
pub const MAX_DONATION_CENTS: u64 = 100_000;

const CURRENCY: &str = "usd";
const DESCRIPTION: &str = "Your Support to Save the World";
const PRODUCT_TAG: &str = "savetheworld-donation";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationIntent {
    pub client_secret: String,
}

/// Dollars to cents, rejecting anything outside $1..=$1,000.
pub fn amount_to_cents(amount: f64) -> Result<u64> {
    let out_of_range = || BrowseError::InvalidInput("Amount must be between $1 and $1,000".into());
    if !amount.is_finite() {
        return Err(out_of_range());
    }
    let cents = (amount * 100.0).round();
    if cents < MIN_DONATION_CENTS as f64 || cents > MAX_DONATION_CENTS as f64 {
        return Err(out_of_range());
    }
    Ok(cents as u64)
}

pub fn donation_request(amount_cents: u64) -> PaymentIntentRequest {
    let mut metadata = BTreeMap::new();
    metadata.insert("product".to_string(), PRODUCT_TAG.to_string());
    PaymentIntentRequest {
        amount_cents,
        currency: CURRENCY.to_string(),
        description: DESCRIPTION.to_string(),
        metadata,
    }
}

pub struct Donations {
    provider: Arc<dyn PaymentProvider>,
}

impl Donations {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub async fn create_intent(&self, amount: f64) -> Result<DonationIntent> {
        let cents = amount_to_cents(amount)?;
        tracing::info!(amount_cents = cents, provider = self.provider.name(), "Creating donation intent");
        let client_secret = self
            .provider
            .create_payment_intent(&donation_request(cents))
            .await?;
        Ok(DonationIntent { client_secret })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_and_bounds_amounts() {
        assert_eq!(amount_to_cents(1.0).unwrap(), 100);
        assert_eq!(amount_to_cents(19.99).unwrap(), 1999);
        assert_eq!(amount_to_cents(1000.0).unwrap(), 100_000);
        assert_eq!(amount_to_cents(0.999).unwrap(), 100);
        for bad in [0.0, 0.5, 1000.01, -5.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(amount_to_cents(bad), Err(BrowseError::InvalidInput(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn request_carries_fixed_fields() {
        let request = donation_request(2500);
        assert_eq!(request.currency, "usd");
        assert_eq!(request.description, "Your Support to Save the World");
        assert_eq!(request.metadata["product"], "savetheworld-donation");
    }
}
