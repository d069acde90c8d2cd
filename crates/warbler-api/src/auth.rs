use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::Response,
};
use tracing::{info, warn};

use warbler_db::models::{NewUser, UserRow};
use warbler_db::{Database, DbError};
use warbler_types::forms::{CsrfForm, FieldErrors, LoginForm, SignupForm, non_empty};
use warbler_types::session::FlashCategory;

use crate::context::{RequestContext, submitted, validate_on_submit};
use crate::error::AppError;
use crate::state::{AppState, with_db};
use crate::views;

// -- Model operations --

/// Hashes the password and inserts the user. Fails with
/// [`DbError::UniqueViolation`] if the username or email is taken, in which
/// case nothing is written.
pub fn signup(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
    image_url: Option<&str>,
) -> Result<UserRow, DbError> {
    let password_hash = hash_password(password)?;

    db.create_user(&NewUser {
        username,
        email,
        password_hash: &password_hash,
        image_url,
    })
}

/// Returns the user if `password` matches the stored hash, `None` otherwise
/// (including unknown usernames). A matching bcrypt hash is replaced with an
/// argon2 one before returning.
pub fn authenticate(db: &Database, username: &str, password: &str) -> anyhow::Result<Option<UserRow>> {
    let Some(mut user) = db.get_user_by_username(username)? else {
        return Ok(None);
    };

    if !verify_password(&user, password) {
        return Ok(None);
    }

    if is_bcrypt_hash(&user.password) {
        let upgraded = hash_password(password)?;
        db.set_password_hash(user.id, &upgraded)?;
        info!(user_id = user.id, "Upgraded bcrypt password hash to argon2");
        user.password = upgraded;
    }

    Ok(Some(user))
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Seed fixtures carry bcrypt hashes (`$2a$`, `$2b$`, `$2y$`).
fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|prefix| hash.starts_with(prefix))
}

pub fn verify_password(user: &UserRow, password: &str) -> bool {
    if is_bcrypt_hash(&user.password) {
        return match bcrypt::verify(password, &user.password) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(user_id = user.id, "Stored bcrypt hash is unreadable: {}", e);
                false
            }
        };
    }

    let Ok(parsed_hash) = PasswordHash::new(&user.password) else {
        warn!(user_id = user.id, "Stored password is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// -- Handlers --

pub async fn signup_form(ctx: RequestContext) -> Response {
    let csrf = ctx.session.csrf_token().to_string();
    let body = views::signup_page(&SignupForm::default(), &FieldErrors::default(), &csrf);
    ctx.session.render(ctx.user.as_ref(), "Sign up", body)
}

pub async fn signup_submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Result<Response, AppError> {
    let RequestContext { mut session, user, .. } = ctx;
    let form = submitted(form);

    let errors = validate_on_submit(&session, &form);
    if !errors.is_empty() {
        let body = views::signup_page(&form, &errors, session.csrf_token());
        return Ok(session.render(user.as_ref(), "Sign up", body));
    }

    let submitted = form.clone();
    let result = with_db(&state, move |db| {
        signup(
            db,
            submitted.username.trim(),
            submitted.email.trim(),
            &submitted.password,
            non_empty(&submitted.image_url),
        )
    })
    .await?;

    match result {
        Ok(new_user) => {
            info!(user_id = new_user.id, username = %new_user.username, "User signed up");
            session.login(new_user.id);
            Ok(session.redirect("/"))
        }
        Err(DbError::UniqueViolation) => {
            session.flash(FlashCategory::Danger, "Username or email already taken");
            let body = views::signup_page(&form, &FieldErrors::default(), session.csrf_token());
            Ok(session.render(user.as_ref(), "Sign up", body))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(ctx: RequestContext) -> Response {
    let csrf = ctx.session.csrf_token().to_string();
    let body = views::login_page(&LoginForm::default(), &FieldErrors::default(), &csrf);
    ctx.session.render(ctx.user.as_ref(), "Log in", body)
}

pub async fn login_submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let RequestContext { mut session, user, .. } = ctx;
    let form = submitted(form);

    let errors = validate_on_submit(&session, &form);
    if errors.is_empty() {
        let username = form.username.trim().to_string();
        let password = form.password.clone();
        let found = with_db(&state, move |db| authenticate(db, &username, &password)).await??;

        if let Some(found) = found {
            info!(user_id = found.id, "User logged in");
            session.login(found.id);
            session.flash(FlashCategory::Success, format!("Hello, {}!", found.username));
            return Ok(session.redirect("/"));
        }

        warn!(username = %form.username, "Failed login attempt");
        session.flash(FlashCategory::Danger, "Invalid credentials.");
    }

    let body = views::login_page(&form, &errors, session.csrf_token());
    Ok(session.render(user.as_ref(), "Log in", body))
}

pub async fn logout(
    ctx: RequestContext,
    form: Result<Form<CsrfForm>, FormRejection>,
) -> Result<Response, AppError> {
    let mut logged_in = ctx.require_user()?;
    let form = submitted(form);

    if validate_on_submit(&logged_in.session, &form).is_empty() {
        info!(user_id = logged_in.user.id, "User logged out");
        logged_in.session.logout();
        logged_in
            .session
            .flash(FlashCategory::Message, "You've successfully logged out!");
    }

    Ok(logged_in.session.redirect("/"))
}
