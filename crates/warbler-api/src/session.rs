//! Signed cookie session: current user id, CSRF token and pending flashes.
//!
//! The whole session lives client-side as an HS256 JWT. A missing, expired or
//! tampered cookie silently yields a fresh anonymous session.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use tracing::{debug, error};

use warbler_db::models::UserRow;
use warbler_types::session::{Flash, FlashCategory, SessionClaims};

use crate::views;

pub const SESSION_COOKIE: &str = "warbler_session";

const SESSION_TTL_DAYS: i64 = 31;

#[derive(Debug, Clone)]
pub struct Session {
    claims: SessionClaims,
    secret: String,
}

impl Session {
    /// A fresh anonymous session with a new CSRF token.
    pub fn new(secret: &str) -> Self {
        Self {
            claims: SessionClaims {
                csrf: generate_csrf_token(),
                ..Default::default()
            },
            secret: secret.to_string(),
        }
    }

    pub fn from_jar(jar: &CookieJar, secret: &str) -> Self {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| Self::decode(cookie.value(), secret))
            .unwrap_or_else(|| Self::new(secret))
    }

    fn decode(token: &str, secret: &str) -> Option<Self> {
        match decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) if !data.claims.csrf.is_empty() => Some(Self {
                claims: data.claims,
                secret: secret.to_string(),
            }),
            Ok(_) => None,
            Err(e) => {
                debug!("Discarding session cookie: {}", e);
                None
            }
        }
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let claims = SessionClaims {
            exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp()
                as usize,
            ..self.claims.clone()
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.claims.curr_user
    }

    /// Logging in or out issues a fresh CSRF token.
    pub fn login(&mut self, user_id: i64) {
        self.claims.curr_user = Some(user_id);
        self.claims.csrf = generate_csrf_token();
    }

    pub fn logout(&mut self) {
        self.claims.curr_user = None;
        self.claims.csrf = generate_csrf_token();
    }

    pub fn csrf_token(&self) -> &str {
        &self.claims.csrf
    }

    pub fn verify_csrf(&self, token: &str) -> bool {
        !token.is_empty() && constant_time_eq(token.as_bytes(), self.claims.csrf.as_bytes())
    }

    pub fn flash(&mut self, category: FlashCategory, message: impl Into<String>) {
        self.claims.flashes.push(Flash {
            category,
            message: message.into(),
        });
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.claims.flashes
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.claims.flashes)
    }

    /// Cookie jar carrying the re-signed session. Empty if signing failed.
    pub fn into_jar(self) -> CookieJar {
        match self.encode() {
            Ok(token) => CookieJar::new().add(
                Cookie::build((SESSION_COOKIE, token))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .build(),
            ),
            Err(e) => {
                error!("Failed to sign session: {}", e);
                CookieJar::new()
            }
        }
    }

    pub fn redirect(self, to: &str) -> Response {
        (self.into_jar(), Redirect::to(to)).into_response()
    }

    /// Renders `body` inside the page layout, consuming pending flashes.
    pub fn render(self, user: Option<&UserRow>, title: &str, body: String) -> Response {
        self.render_with_status(StatusCode::OK, user, title, body)
    }

    pub fn render_with_status(
        mut self,
        status: StatusCode,
        user: Option<&UserRow>,
        title: &str,
        body: String,
    ) -> Response {
        let flashes = self.take_flashes();
        let html = views::layout(title, user, &flashes, self.csrf_token(), &body);
        (status, self.into_jar(), Html(html)).into_response()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Only same-site paths are followed; anything else goes home.
pub fn safe_redirect_target(target: &str) -> &str {
    if target.starts_with('/') && !target.starts_with("//") && !target.contains('\\') {
        target
    } else {
        "/"
    }
}
