use serde::{Deserialize, Serialize};

/// Claims carried in the signed session cookie.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Id of the logged-in user, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_user: Option<i64>,
    /// Per-session CSRF token echoed back by every form.
    pub csrf: String,
    /// Flashes queued for the next rendered page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Message,
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashCategory {
    /// CSS class suffix used by the page layout.
    pub fn as_str(self) -> &'static str {
        match self {
            FlashCategory::Message => "message",
            FlashCategory::Success => "success",
            FlashCategory::Info => "info",
            FlashCategory::Warning => "warning",
            FlashCategory::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}
