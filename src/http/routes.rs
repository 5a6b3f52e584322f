use axum::{routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn feed() -> Router<AppState> {
    Router::new().route("/feed", get(handlers::feed_page))
}

pub fn tweets() -> Router<AppState> {
    Router::new()
        .route("/tweets", post(handlers::create_tweet))
        .route("/tweets/:id/like", post(handlers::toggle_like))
}

pub fn profiles() -> Router<AppState> {
    Router::new()
        .route("/profiles/:id", get(handlers::get_profile))
        .route("/profiles/:id/tweets", get(handlers::list_profile_tweets))
        .route("/profiles/:id/follow", post(handlers::toggle_follow))
}
