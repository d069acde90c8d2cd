use axum::{
    Form,
    extract::{Query, State, rejection::FormRejection},
    response::Response,
};
use serde::Deserialize;
use tracing::{info, warn};

use warbler_db::DbError;
use warbler_db::models::{ProfileUpdate, UserRow};
use warbler_types::forms::{CsrfForm, EditProfileForm, FieldErrors, non_empty};
use warbler_types::session::FlashCategory;

use crate::auth::verify_password;
use crate::context::{
    IdParam, LoggedIn, RequestContext, submitted, validate_on_submit, viewer_sets,
};
use crate::error::AppError;
use crate::session::safe_redirect_target;
use crate::state::{AppState, with_db};
use crate::views::{self, Viewer};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /users: all users, or those whose username contains `q`.
pub async fn list_users(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let search = query.q.as_deref().and_then(non_empty).map(str::to_string);

    let q = search.clone();
    let users = with_db(&state, move |db| db.search_users(q.as_deref())).await??;
    let sets = viewer_sets(&state, ctx.user.as_ref()).await?;

    let body = views::users_index(
        &users,
        search.as_deref(),
        &Viewer {
            user: ctx.user.as_ref(),
            csrf: ctx.session.csrf_token(),
            following: &sets.following,
            liked: &sets.liked,
            came_from: &ctx.path,
        },
    );
    Ok(ctx.session.render(ctx.user.as_ref(), "Users", body))
}

async fn load_user(state: &AppState, user_id: i64) -> Result<UserRow, AppError> {
    with_db(state, move |db| db.get_user(user_id))
        .await??
        .ok_or(AppError::NotFound)
}

/// GET /users/{id}: profile with the user's messages.
pub async fn show_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(user_id): IdParam,
) -> Result<Response, AppError> {
    let owner = load_user(&state, user_id).await?;
    let (stats, messages) = with_db(&state, move |db| {
        Ok::<_, anyhow::Error>((db.user_stats(user_id)?, db.messages_for_user(user_id)?))
    })
    .await??;
    let sets = viewer_sets(&state, ctx.user.as_ref()).await?;

    let body = views::user_profile(
        &owner,
        &stats,
        &messages,
        &Viewer {
            user: ctx.user.as_ref(),
            csrf: ctx.session.csrf_token(),
            following: &sets.following,
            liked: &sets.liked,
            came_from: &ctx.path,
        },
    );
    Ok(ctx.session.render(ctx.user.as_ref(), &format!("@{}", owner.username), body))
}

#[derive(Clone, Copy)]
enum Connections {
    Following,
    Followers,
}

async fn show_connections(
    state: AppState,
    ctx: RequestContext,
    user_id: i64,
    which: Connections,
) -> Result<Response, AppError> {
    let LoggedIn { session, user, path } = ctx.require_user()?;

    let owner = load_user(&state, user_id).await?;
    let (stats, users) = with_db(&state, move |db| {
        let users = match which {
            Connections::Following => db.list_following(user_id)?,
            Connections::Followers => db.list_followers(user_id)?,
        };
        Ok::<_, anyhow::Error>((db.user_stats(user_id)?, users))
    })
    .await??;
    let sets = viewer_sets(&state, Some(&user)).await?;

    let body = views::user_connections(
        &owner,
        &stats,
        &users,
        &Viewer {
            user: Some(&user),
            csrf: session.csrf_token(),
            following: &sets.following,
            liked: &sets.liked,
            came_from: &path,
        },
    );
    let title = match which {
        Connections::Following => format!("@{} is following", owner.username),
        Connections::Followers => format!("@{}'s followers", owner.username),
    };
    Ok(session.render(Some(&user), &title, body))
}

/// GET /users/{id}/following
pub async fn show_following(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(user_id): IdParam,
) -> Result<Response, AppError> {
    show_connections(state, ctx, user_id, Connections::Following).await
}

/// GET /users/{id}/followers
pub async fn show_followers(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(user_id): IdParam,
) -> Result<Response, AppError> {
    show_connections(state, ctx, user_id, Connections::Followers).await
}

/// GET /users/{id}/liked_messages
pub async fn liked_messages(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(user_id): IdParam,
) -> Result<Response, AppError> {
    let LoggedIn { session, user, path } = ctx.require_user()?;

    let owner = load_user(&state, user_id).await?;
    let (stats, messages) = with_db(&state, move |db| {
        Ok::<_, anyhow::Error>((db.user_stats(user_id)?, db.liked_messages(user_id)?))
    })
    .await??;
    let sets = viewer_sets(&state, Some(&user)).await?;

    let body = views::liked_messages(
        &owner,
        &stats,
        &messages,
        &Viewer {
            user: Some(&user),
            csrf: session.csrf_token(),
            following: &sets.following,
            liked: &sets.liked,
            came_from: &path,
        },
    );
    Ok(session.render(Some(&user), &format!("Liked by @{}", owner.username), body))
}

/// POST /users/follow/{id}
pub async fn add_follow(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(follow_id): IdParam,
    form: Result<Form<CsrfForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { mut session, user, .. } = ctx.require_user()?;
    let form = submitted(form);
    let back = safe_redirect_target(&form.came_from);

    if !validate_on_submit(&session, &form).is_empty() {
        return Ok(session.redirect(back));
    }

    let followed = load_user(&state, follow_id).await?;
    let follower_id = user.id;
    with_db(&state, move |db| db.follow(follower_id, follow_id)).await??;

    info!(follower = follower_id, followed = follow_id, "Follow added");
    session.flash(
        FlashCategory::Info,
        format!("You are now following {}!", followed.username),
    );
    Ok(session.redirect(back))
}

/// POST /users/stop-following/{id}
pub async fn stop_following(
    State(state): State<AppState>,
    ctx: RequestContext,
    IdParam(follow_id): IdParam,
    form: Result<Form<CsrfForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { mut session, user, .. } = ctx.require_user()?;
    let form = submitted(form);
    let back = safe_redirect_target(&form.came_from);

    if !validate_on_submit(&session, &form).is_empty() {
        return Ok(session.redirect(back));
    }

    let followed = load_user(&state, follow_id).await?;
    let follower_id = user.id;
    with_db(&state, move |db| db.unfollow(follower_id, follow_id)).await??;

    info!(follower = follower_id, followed = follow_id, "Follow removed");
    session.flash(
        FlashCategory::Warning,
        format!("You've unfollowed {}.", followed.username),
    );
    Ok(session.redirect(back))
}

fn profile_form(user: &UserRow) -> EditProfileForm {
    EditProfileForm {
        username: user.username.clone(),
        email: user.email.clone(),
        image_url: user.image_url.clone(),
        header_image_url: user.header_image_url.clone(),
        bio: user.bio.clone().unwrap_or_default(),
        location: user.location.clone().unwrap_or_default(),
        ..Default::default()
    }
}

/// GET /users/profile
pub async fn edit_profile_form(ctx: RequestContext) -> Result<Response, AppError> {
    let LoggedIn { session, user, .. } = ctx.require_user()?;

    let body = views::edit_profile_page(&profile_form(&user), &FieldErrors::default(), session.csrf_token());
    Ok(session.render(Some(&user), "Edit Profile", body))
}

/// POST /users/profile: saves only if the current password checks out.
pub async fn edit_profile(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<EditProfileForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { mut session, user, .. } = ctx.require_user()?;
    let form = submitted(form);

    let errors = validate_on_submit(&session, &form);
    if errors.is_empty() {
        let (stored, password) = (user.clone(), form.password.clone());
        let password_ok = with_db(&state, move |_| verify_password(&stored, &password)).await?;

        if password_ok {
            let user_id = user.id;
            let submitted = form.clone();
            let result = with_db(&state, move |db| {
                db.update_user(
                    user_id,
                    &ProfileUpdate {
                        username: submitted.username.trim(),
                        email: submitted.email.trim(),
                        image_url: non_empty(&submitted.image_url),
                        header_image_url: non_empty(&submitted.header_image_url),
                        bio: non_empty(&submitted.bio),
                        location: non_empty(&submitted.location),
                    },
                )
            })
            .await?;

            match result {
                Ok(()) => {
                    info!(user_id, "Profile updated");
                    session.flash(FlashCategory::Success, "Profile successfully updated!");
                    return Ok(session.redirect(&format!("/users/{user_id}")));
                }
                Err(DbError::UniqueViolation) => {
                    session.flash(FlashCategory::Danger, "Username or email already taken");
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            warn!(user_id = user.id, "Profile edit with wrong password");
            session.flash(FlashCategory::Danger, "Incorrect password.");
        }
    }

    let body = views::edit_profile_page(&form, &errors, session.csrf_token());
    Ok(session.render(Some(&user), "Edit Profile", body))
}

/// POST /users/delete: removes the account and everything that references it.
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<CsrfForm>, FormRejection>,
) -> Result<Response, AppError> {
    let LoggedIn { mut session, user, .. } = ctx.require_user()?;
    let form = submitted(form);

    if validate_on_submit(&session, &form).is_empty() {
        let user_id = user.id;
        with_db(&state, move |db| db.delete_user(user_id)).await??;

        info!(user_id, username = %user.username, "User deleted");
        session.logout();
        session.flash(FlashCategory::Warning, "User successfully deleted :(");
    }

    Ok(session.redirect("/signup"))
}
