use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::Response,
};
use tracing::{info, warn};

use warbler_types::forms::CsrfForm;
use warbler_types::session::FlashCategory;

use crate::context::{IdParam, LoggedIn, RequestContext, submitted, validate_on_submit};
use crate::error::AppError;
use crate::session::safe_redirect_target;
use crate::state::{AppState, with_db};

/// POST /like/{id}
pub async fn like_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(message_id): IdParam,
    form: Result<Form<CsrfForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { mut session, user, .. } = ctx.require_user()?;
    let form = submitted(form);
    let back = safe_redirect_target(&form.came_from);

    if !validate_on_submit(&session, &form).is_empty() {
        session.flash(FlashCategory::Danger, "Warble message like unsuccessful.");
        return Ok(session.redirect(back));
    }

    with_db(&state, move |db| db.get_message(message_id))
        .await??
        .ok_or(AppError::NotFound)?;

    let liker_id = user.id;
    let added = with_db(&state, move |db| db.like(liker_id, message_id)).await??;
    if added {
        info!(liker_id, message_id, "Like added");
    }

    session.flash(FlashCategory::Success, "Warble message liked!");
    Ok(session.redirect(back))
}

/// POST /unlike/{id}: removing a like that isn't there is a no-op.
pub async fn unlike_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(message_id): IdParam,
    form: Result<Form<CsrfForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { mut session, user, .. } = ctx.require_user()?;
    let form = submitted(form);
    let back = safe_redirect_target(&form.came_from);

    if !validate_on_submit(&session, &form).is_empty() {
        warn!(user_id = user.id, message_id, "Unlike rejected");
        session.flash(FlashCategory::Danger, "Warble message unlike unsuccessful.");
        return Ok(session.redirect(back));
    }

    let liker_id = user.id;
    let removed = with_db(&state, move |db| db.unlike(liker_id, message_id)).await??;
    if removed {
        info!(liker_id, message_id, "Like removed");
        session.flash(FlashCategory::Warning, "You have unliked this post!");
    }

    Ok(session.redirect(back))
}
