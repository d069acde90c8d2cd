//! Form payloads posted by the HTML pages, and their validators.
//!
//! Every field is defaulted so that a missing field shows up as a validation
//! error on the re-rendered form instead of a rejected request.

use serde::Deserialize;

pub const MAX_USERNAME_LEN: usize = 30;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_MESSAGE_LEN: usize = 140;

/// Validation errors keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|(f, _)| *f == field)
    }

    /// Messages attached to `field`, in insertion order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }
}

/// A submitted form: field validation plus the CSRF token it carries.
pub trait Form {
    fn csrf_token(&self) -> &str;

    fn validate(&self) -> FieldErrors;
}

/// Treats a blank optional field as absent.
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(field, "This field is required.");
        return false;
    }
    true
}

fn check_username(errors: &mut FieldErrors, value: &str) {
    if require(errors, "username", value) && value.trim().chars().count() > MAX_USERNAME_LEN {
        errors.push(
            "username",
            format!("Field cannot be longer than {MAX_USERNAME_LEN} characters."),
        );
    }
}

fn check_password(errors: &mut FieldErrors, value: &str) {
    if value.chars().count() < MIN_PASSWORD_LEN {
        errors.push(
            "password",
            format!("Field must be at least {MIN_PASSWORD_LEN} characters long."),
        );
    }
}

fn check_email(errors: &mut FieldErrors, value: &str) {
    if !require(errors, "email", value) {
        return;
    }
    if !looks_like_email(value.trim()) {
        errors.push("email", "Invalid email address.");
    }
}

/// Same shape check as a typical `Email()` field validator: one `@`, a
/// non-empty local part and a dotted domain, no whitespace.
pub fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub csrf_token: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
}

impl Form for SignupForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        check_username(&mut errors, &self.username);
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub csrf_token: String,
    pub username: String,
    pub password: String,
}

impl Form for LoginForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        require(&mut errors, "username", &self.username);
        check_password(&mut errors, &self.password);
        errors
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub csrf_token: String,
    pub text: String,
}

impl Form for MessageForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if require(&mut errors, "text", &self.text)
            && self.text.chars().count() > MAX_MESSAGE_LEN
        {
            errors.push(
                "text",
                format!("Field cannot be longer than {MAX_MESSAGE_LEN} characters."),
            );
        }
        errors
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EditProfileForm {
    pub csrf_token: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: String,
    pub location: String,
    /// Current password, re-verified before anything is saved.
    pub password: String,
}

impl Form for EditProfileForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        check_username(&mut errors, &self.username);
        check_email(&mut errors, &self.email);
        require(&mut errors, "password", &self.password);
        errors
    }
}

/// Carries nothing but the CSRF token (and where to go back to).
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CsrfForm {
    pub csrf_token: String,
    #[serde(rename = "came-from")]
    pub came_from: String,
}

impl Form for CsrfForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn validate(&self) -> FieldErrors {
        FieldErrors::default()
    }
}
