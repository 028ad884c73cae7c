use std::sync::Arc;

use crate::config::Config;
use crate::payments::stripe::StripeClient;

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub stripe: StripeClient,
}
