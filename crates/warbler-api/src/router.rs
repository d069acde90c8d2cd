//! Axum router construction.

use std::path::Path;

use axum::{
    Router,
    http::{HeaderValue, header::CACHE_CONTROL},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, likes, messages, pages, users};

/// Build the complete router: pages, form endpoints and static assets.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::homepage))
        // Signup / login / logout
        .route("/signup", get(auth::signup_form).post(auth::signup_submit))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        // Users
        .route("/users", get(users::list_users))
        .route(
            "/users/profile",
            get(users::edit_profile_form).post(users::edit_profile),
        )
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/{id}", post(users::add_follow))
        .route("/users/stop-following/{id}", post(users::stop_following))
        .route("/users/{id}", get(users::show_user))
        .route("/users/{id}/following", get(users::show_following))
        .route("/users/{id}/followers", get(users::show_followers))
        .route("/users/{id}/liked_messages", get(users::liked_messages))
        // Messages
        .route(
            "/messages/new",
            get(messages::new_message_form).post(messages::create_message),
        )
        .route("/messages/{id}", get(messages::show_message))
        .route("/messages/{id}/delete", post(messages::delete_message))
        // Likes
        .route("/like/{id}", post(likes::like_message))
        .route("/unlike/{id}", post(likes::unlike_message))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(pages::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
