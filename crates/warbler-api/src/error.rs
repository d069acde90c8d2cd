use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use warbler_db::DbError;
use warbler_types::session::FlashCategory;

use crate::session::Session;
use crate::views;

/// Failures that end a request early.
#[derive(Error, Debug)]
pub enum AppError {
    /// No logged-in user, or acting on something the user does not own.
    /// Answered with a flash and a redirect home.
    #[error("Access unauthorized.")]
    Unauthorized(Box<Session>),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized(mut session) => {
                session.flash(FlashCategory::Danger, "Access unauthorized.");
                session.redirect("/")
            }
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Html(views::bare_page(404, "Page not found."))).into_response()
            }
            AppError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::bare_page(500, "Something went wrong.")),
                )
                    .into_response()
            }
        }
    }
}
