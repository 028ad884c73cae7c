use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub site_addr: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub stripe_secret_key: String,
    pub nominatim_url: String,
    /// Platform cut of the post-processor remainder, in percent.
    pub platform_fee_percent: f64,
    pub connect_refresh_url: String,
    pub connect_return_url: String,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
}

impl Config {
    /// Loads configuration from the environment. Required variables hard-fail
    /// at boot; the rest fall back to defaults with a log line.
    pub fn from_env() -> Self {
        let _ = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        Config {
            site_addr: optional("SITE_ADDR", "127.0.0.1:3000"),
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: optional("MONGODB_DATABASE", "tavern"),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set"),
            nominatim_url: optional("NOMINATIM_URL", "https://nominatim.openstreetmap.org"),
            platform_fee_percent: optional("PLATFORM_FEE_PERCENT", "10")
                .parse()
                .expect("PLATFORM_FEE_PERCENT must be numeric"),
            connect_refresh_url: optional("CONNECT_REFRESH_URL", "http://localhost:3000/payments/refresh"),
            connect_return_url: optional("CONNECT_RETURN_URL", "http://localhost:3000/payments/return"),
            checkout_success_url: optional(
                "CHECKOUT_SUCCESS_URL",
                "http://localhost:3000/checkout/success",
            ),
            checkout_cancel_url: optional(
                "CHECKOUT_CANCEL_URL",
                "http://localhost:3000/checkout/cancel",
            ),
        }
    }
}

fn optional(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        log::info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}
