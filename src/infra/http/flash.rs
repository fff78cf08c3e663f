//! One-shot flash messages carried across a redirect in a short-lived cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::presentation::views::FlashView;

const FLASH_COOKIE: &str = "mortar_flash";

#[derive(Debug, Serialize, Deserialize)]
struct FlashPayload {
    kind: String,
    text: String,
}

/// Queue a flash message for the next rendered page.
pub fn set_flash(jar: CookieJar, kind: &str, text: impl Into<String>) -> CookieJar {
    let payload = FlashPayload {
        kind: kind.to_string(),
        text: text.into(),
    };
    let encoded = match serde_json::to_vec(&payload) {
        Ok(bytes) => URL_SAFE_NO_PAD.encode(bytes),
        Err(_) => return jar,
    };

    let cookie = Cookie::build((FLASH_COOKIE, encoded))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn flash_success(jar: CookieJar, text: impl Into<String>) -> CookieJar {
    set_flash(jar, "success", text)
}

pub fn flash_error(jar: CookieJar, text: impl Into<String>) -> CookieJar {
    set_flash(jar, "error", text)
}

pub fn flash_warning(jar: CookieJar, text: impl Into<String>) -> CookieJar {
    set_flash(jar, "warning", text)
}

/// Consume any pending flash message, clearing its cookie.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<FlashView>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let decoded = URL_SAFE_NO_PAD
        .decode(cookie.value())
        .ok()
        .and_then(|bytes| serde_json::from_slice::<FlashPayload>(&bytes).ok())
        .map(|payload| FlashView {
            kind: payload.kind,
            text: payload.text,
        });

    let removal = Cookie::build((FLASH_COOKIE, "")).path("/").build();
    (jar.remove(removal), decoded)
}
