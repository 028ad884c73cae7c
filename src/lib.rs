pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod roster;
pub mod state;
