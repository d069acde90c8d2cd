use axum::{extract::State, http::StatusCode, response::Response};

use warbler_db::models::FEED_LIMIT;

use crate::context::{RequestContext, viewer_sets};
use crate::error::AppError;
use crate::state::{AppState, with_db};
use crate::views::{self, Viewer};

/// GET /: landing page for visitors, feed for logged-in users.
pub async fn homepage(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let RequestContext { session, user, path } = ctx;

    let Some(user) = user else {
        return Ok(session.render(None, "Home", views::home_anon()));
    };

    let user_id = user.id;
    let (stats, feed) = with_db(&state, move |db| {
        Ok::<_, anyhow::Error>((db.user_stats(user_id)?, db.home_feed(user_id, FEED_LIMIT)?))
    })
    .await??;
    let sets = viewer_sets(&state, Some(&user)).await?;

    let body = views::home(
        &user,
        &stats,
        &feed,
        &Viewer {
            user: Some(&user),
            csrf: session.csrf_token(),
            following: &sets.following,
            liked: &sets.liked,
            came_from: &path,
        },
    );
    Ok(session.render(Some(&user), "Home", body))
}

pub async fn not_found(ctx: RequestContext) -> Response {
    ctx.session.render_with_status(
        StatusCode::NOT_FOUND,
        ctx.user.as_ref(),
        "Not Found",
        views::not_found(),
    )
}
