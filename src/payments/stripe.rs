use serde::Deserialize;
use thiserror::Error;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Stripe request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe rejected the request: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectAccount {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountLink {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct CheckoutParams<'a> {
    pub product_name: &'a str,
    pub unit_amount_cents: i64,
    pub application_fee_cents: i64,
    pub destination_account: &'a str,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

/// Thin client over Stripe's REST API. Requests are form-encoded posts with an
/// idempotency key per call; response bodies deserialize straight into the few
/// fields this service reads.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, secret_key: String) -> Self {
        StripeClient { http, secret_key }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T, StripeError> {
        let response = self
            .http
            .post(format!("{}{}", STRIPE_API_BASE, path))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            Err(StripeError::Api(message))
        }
    }

    /// Creates a Checkout Session splitting the charge between the platform
    /// and the host's connected account.
    pub async fn create_checkout_session(
        &self,
        params: CheckoutParams<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), params.success_url.to_string()),
            ("cancel_url".to_string(), params.cancel_url.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                "usd".to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                params.product_name.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                params.unit_amount_cents.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "payment_intent_data[application_fee_amount]".to_string(),
                params.application_fee_cents.to_string(),
            ),
            (
                "payment_intent_data[transfer_data][destination]".to_string(),
                params.destination_account.to_string(),
            ),
        ];

        self.post("/checkout/sessions", form).await
    }

    /// Creates an Express account for a host who has not onboarded yet.
    pub async fn create_express_account(&self, email: &str) -> Result<ConnectAccount, StripeError> {
        let form = vec![
            ("type".to_string(), "express".to_string()),
            ("email".to_string(), email.to_string()),
        ];
        self.post("/accounts", form).await
    }

    /// Creates a one-time onboarding link for an Express account.
    pub async fn create_account_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<AccountLink, StripeError> {
        let form = vec![
            ("account".to_string(), account_id.to_string()),
            ("refresh_url".to_string(), refresh_url.to_string()),
            ("return_url".to_string(), return_url.to_string()),
            ("type".to_string(), "account_onboarding".to_string()),
        ];
        self.post("/account_links", form).await
    }
}

impl From<StripeError> for crate::errors::ApiError {
    fn from(e: StripeError) -> Self {
        crate::errors::ApiError::Upstream(e.to_string())
    }
}
