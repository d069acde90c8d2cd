//! Request-scoped context: the decoded session and the user it names.
//!
//! Handlers take a [`RequestContext`] argument instead of reading any ambient
//! "current user"; routes that need a login call [`RequestContext::require_user`].

use std::collections::HashSet;
use std::convert::Infallible;

use axum::{
    Form,
    extract::{FromRef, FromRequestParts, Path, rejection::FormRejection},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use warbler_db::models::UserRow;
use warbler_types::forms::{FieldErrors, Form as FormTrait};

use crate::error::AppError;
use crate::session::Session;
use crate::state::{AppState, with_db};

pub struct RequestContext {
    pub session: Session,
    pub user: Option<UserRow>,
    /// Path and query of this request, used as the "came-from" target.
    pub path: String,
}

/// A request with a logged-in user.
pub struct LoggedIn {
    pub session: Session,
    pub user: UserRow,
    pub path: String,
}

impl RequestContext {
    /// Short-circuits with [`AppError::Unauthorized`] unless someone is logged in.
    pub fn require_user(self) -> Result<LoggedIn, AppError> {
        match self.user {
            Some(user) => Ok(LoggedIn {
                session: self.session,
                user,
                path: self.path,
            }),
            None => Err(AppError::Unauthorized(Box::new(self.session))),
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Session::from_jar(&jar, &app.secret_key))
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };
        let app = AppState::from_ref(state);

        // A session naming a deleted user counts as anonymous.
        let user = match session.user_id() {
            Some(id) => with_db(&app, move |db| db.get_user(id)).await??,
            None => None,
        };

        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Ok(Self {
            session,
            user,
            path,
        })
    }
}

/// A numeric `{id}` path segment. Anything else is a 404, like a route that
/// doesn't exist.
#[derive(Debug, Clone, Copy)]
pub struct IdParam(pub i64);

impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                debug!(path = %parts.uri.path(), "Non-numeric id: {}", rejection);
                Err(AppError::NotFound)
            }
        }
    }
}

/// Unwraps a submitted form. A missing or unreadable body becomes the empty
/// form, which then fails its CSRF check.
pub fn submitted<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!("Unreadable form body: {}", rejection);
            T::default()
        }
    }
}

/// Field validation plus the CSRF check every submitted form must pass.
pub fn validate_on_submit<F: FormTrait>(session: &Session, form: &F) -> FieldErrors {
    let mut errors = form.validate();
    if !session.verify_csrf(form.csrf_token()) {
        warn!("Rejected form submission with a bad CSRF token");
        errors.push("csrf_token", "The CSRF token is invalid.");
    }
    errors
}

/// What the viewer follows and likes, for rendering toggle buttons.
#[derive(Debug, Default)]
pub struct ViewerSets {
    pub following: HashSet<i64>,
    pub liked: HashSet<i64>,
}

pub async fn viewer_sets(state: &AppState, user: Option<&UserRow>) -> Result<ViewerSets, AppError> {
    let Some(user_id) = user.map(|u| u.id) else {
        return Ok(ViewerSets::default());
    };

    let sets = with_db(state, move |db| {
        Ok::<_, anyhow::Error>(ViewerSets {
            following: db.following_ids(user_id)?,
            liked: db.liked_message_ids(user_id)?,
        })
    })
    .await??;

    Ok(sets)
}
