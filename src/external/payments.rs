use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;

use crate::error::{
    invalid_input_error, payment_declined_error, upstream_error, Error,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
}

pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Phase one of the two-phase flow: places a hold for `amount_minor` against
/// the customer's payment method token.
#[tracing::instrument(skip(method_token))]
pub async fn authorize(method_token: &str, amount_minor: i64) -> Result<PaymentIntent, Error> {
    if amount_minor <= 0 {
        return Err(invalid_input_error());
    }

    let api_base = env::var("PAYMENTS_API_BASE")?;
    let key = env::var("PAYMENTS_API_KEY")?;

    let res = reqwest::Client::new()
        .post(format!("https://{}/v1/intents", api_base))
        .bearer_auth(key)
        .json(&json!({
            "payment_method": method_token,
            "amount": amount_minor,
            "capture": false,
        }))
        .send()
        .await?;

    intent_from_response(res).await
}

/// Phase two: captures a previously authorized intent.
#[tracing::instrument]
pub async fn capture(intent_id: &str) -> Result<PaymentIntent, Error> {
    let api_base = env::var("PAYMENTS_API_BASE")?;
    let key = env::var("PAYMENTS_API_KEY")?;

    let res = reqwest::Client::new()
        .post(format!("https://{}/v1/intents/{}/capture", api_base, intent_id))
        .bearer_auth(key)
        .send()
        .await?;

    intent_from_response(res).await
}

async fn intent_from_response(res: reqwest::Response) -> Result<PaymentIntent, Error> {
    let status_code = res.status().as_u16();

    if status_code == 402 {
        return Err(payment_declined_error());
    } else if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if !(status_code == 200 || status_code == 201) {
        return Err(upstream_error());
    }

    Ok(res.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_convert_to_minor_units() {
        assert_eq!(to_minor_units(85.0), 8500);
        assert_eq!(to_minor_units(74.99), 7499);
        assert_eq!(to_minor_units(0.005), 1);
    }
}
