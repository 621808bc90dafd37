// src/web/flash.rs
//! One-shot messages carried across a redirect in a signed cookie.
use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies, Key};

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Warning,
    Error,
}

impl FlashKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashKind::Success => "flash-success",
            FlashKind::Warning => "flash-warning",
            FlashKind::Error => "flash-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Error, message: message.into() }
    }

    fn encode(&self) -> Option<String> {
        serde_json::to_string(self)
            .map(|json| urlencoding::encode(&json).into_owned())
            .map_err(|e| tracing::error!("Failed to encode flash message: {:?}", e))
            .ok()
    }

    fn decode(raw: &str) -> Option<Self> {
        let json = urlencoding::decode(raw).ok()?;
        serde_json::from_str(&json).ok()
    }
}

/// Queues a message for the next rendered page.
pub fn push(cookies: &Cookies, key: &Key, flash: Flash) {
    let Some(value) = flash.encode() else { return };
    let cookie = Cookie::build((FLASH_COOKIE, value)).path("/").http_only(true).build();
    cookies.signed(key).add(cookie);
}

/// Post/Redirect/Get: queue the message and send the browser on.
pub fn redirect(cookies: &Cookies, key: &Key, flash: Flash, to: &str) -> Redirect {
    push(cookies, key, flash);
    Redirect::to(to)
}

/// Reads and clears the pending message. Tampered cookies are dropped.
pub fn take(cookies: &Cookies, key: &Key) -> Option<Flash> {
    let signed = cookies.signed(key);
    let cookie = signed.get(FLASH_COOKIE)?;
    signed.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    Flash::decode(cookie.value())
}
