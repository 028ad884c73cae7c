use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use dotenv::dotenv;
use env_logger::Env;
use tower_http::trace::TraceLayer;

use tavern::config::Config;
use tavern::database;
use tavern::handlers::{
    auth, campaigns, characters, flags, games, listings, messages, payments, users, vendors,
};
use tavern::payments::stripe::StripeClient;
use tavern::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let addr = config.site_addr.clone();

    let db = database::connect(&config.mongodb_uri, &config.mongodb_database)
        .await
        .expect("Failed to connect to MongoDB");

    let http = reqwest::Client::builder()
        .user_agent(concat!("tavern/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client");

    let stripe = StripeClient::new(http.clone(), config.stripe_secret_key.clone());

    let app_state = AppState {
        db,
        config: Arc::new(config),
        http,
        stripe,
    };

    let app = Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/users", get(users::list_users))
        .route("/api/users/me", get(users::me).put(users::update_me))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/ambassador", post(users::set_ambassador))
        .route("/api/games", post(games::create_game).get(games::list_games))
        .route(
            "/api/games/:id",
            get(games::get_game)
                .put(games::update_game)
                .delete(games::delete_game),
        )
        .route("/api/games/:id/join", post(games::join_game))
        .route("/api/games/:id/leave", post(games::leave_game))
        .route("/api/games/:id/approve", post(games::approve_player))
        .route("/api/games/:id/deny", post(games::deny_player))
        .route("/api/games/:id/remove", post(games::remove_player))
        .route(
            "/api/campaigns",
            post(campaigns::create_campaign).get(campaigns::list_campaigns),
        )
        .route(
            "/api/campaigns/:id",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
        .route("/api/campaigns/:id/join", post(campaigns::join_campaign))
        .route("/api/campaigns/:id/leave", post(campaigns::leave_campaign))
        .route("/api/campaigns/:id/approve", post(campaigns::approve_player))
        .route("/api/campaigns/:id/deny", post(campaigns::deny_player))
        .route("/api/campaigns/:id/remove", post(campaigns::remove_player))
        .route("/api/campaigns/:id/checkout", post(campaigns::checkout))
        .route("/api/payments/connect", post(payments::connect))
        .route(
            "/api/characters",
            post(characters::create_character).get(characters::list_characters),
        )
        .route(
            "/api/characters/:id",
            get(characters::get_character)
                .put(characters::update_character)
                .delete(characters::delete_character),
        )
        .route(
            "/api/messages",
            post(messages::send_message).get(messages::inbox),
        )
        .route("/api/messages/:id/read", post(messages::mark_read))
        .route("/api/messages/:id", axum::routing::delete(messages::delete_message))
        .route("/api/flags", post(flags::create_flag).get(flags::list_flags))
        .route("/api/flags/:id/resolve", post(flags::resolve_flag))
        .route(
            "/api/vendors",
            get(vendors::list_vendors).post(vendors::create_vendor),
        )
        .route(
            "/api/vendors/:id",
            put(vendors::update_vendor).delete(vendors::delete_vendor),
        )
        .route(
            "/api/listings",
            post(listings::create_listing).get(listings::list_listings),
        )
        .route(
            "/api/listings/:id",
            get(listings::get_listing)
                .put(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    log::info!("Starting server at {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    log::info!("listening on http://{}", &addr);
    axum::serve(listener, app.into_make_service()).await.unwrap();
}
