use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::Response,
};
use tracing::{info, warn};

use warbler_types::forms::{CsrfForm, FieldErrors, MessageForm};
use warbler_types::session::FlashCategory;

use crate::context::{
    IdParam, LoggedIn, RequestContext, submitted, validate_on_submit, viewer_sets,
};
use crate::error::AppError;
use crate::state::{AppState, with_db};
use crate::views::{self, Viewer};

/// GET /messages/new
pub async fn new_message_form(ctx: RequestContext) -> Result<Response, AppError> {
    let LoggedIn { session, user, .. } = ctx.require_user()?;

    let body = views::new_message_page(&MessageForm::default(), &FieldErrors::default(), session.csrf_token());
    Ok(session.render(Some(&user), "New Message", body))
}

/// POST /messages/new
pub async fn create_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<MessageForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { session, user, .. } = ctx.require_user()?;
    let form = submitted(form);

    let errors = validate_on_submit(&session, &form);
    if !errors.is_empty() {
        let body = views::new_message_page(&form, &errors, session.csrf_token());
        return Ok(session.render(Some(&user), "New Message", body));
    }

    let user_id = user.id;
    let text = form.text;
    let message = with_db(&state, move |db| db.create_message(user_id, &text)).await??;

    info!(user_id, message_id = message.id, "Message created");
    Ok(session.redirect(&format!("/users/{user_id}")))
}

/// GET /messages/{id}
pub async fn show_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(message_id): IdParam,
) -> Result<Response, AppError> {
    let message = with_db(&state, move |db| db.get_message(message_id))
        .await??
        .ok_or(AppError::NotFound)?;
    let sets = viewer_sets(&state, ctx.user.as_ref()).await?;

    let body = views::message_page(
        &message,
        &Viewer {
            user: ctx.user.as_ref(),
            csrf: ctx.session.csrf_token(),
            following: &sets.following,
            liked: &sets.liked,
            came_from: &ctx.path,
        },
    );
    Ok(ctx.session.render(ctx.user.as_ref(), "Message", body))
}

/// POST /messages/{id}/delete: only the author may delete.
pub async fn delete_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(message_id): IdParam,
    form: Result<Form<CsrfForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { mut session, user, .. } = ctx.require_user()?;
    let form = submitted(form);
    let profile = format!("/users/{}", user.id);

    if !validate_on_submit(&session, &form).is_empty() {
        return Ok(session.redirect(&profile));
    }

    let message = with_db(&state, move |db| db.get_message(message_id))
        .await??
        .ok_or(AppError::NotFound)?;

    if message.user_id != user.id {
        warn!(user_id = user.id, message_id, owner = message.user_id, "Refused to delete another user's message");
        return Err(AppError::Unauthorized(Box::new(session)));
    }

    with_db(&state, move |db| db.delete_message(message_id)).await??;

    info!(user_id = user.id, message_id, "Message deleted");
    session.flash(FlashCategory::Warning, "Your Warble has been deleted.");
    Ok(session.redirect(&profile))
}
