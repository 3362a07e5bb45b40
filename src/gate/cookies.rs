use axum::http::{HeaderMap, HeaderValue, header};
use tracing::warn;

use crate::identity::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, SessionTokens};

/// Refresh tokens outlive access tokens; keep the cookie around for 400 days.
const REFRESH_COOKIE_MAX_AGE: u64 = 400 * 24 * 60 * 60;

/// A cookie the gate asks the browser to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: &'static str,
    pub value: String,
    pub max_age: Option<u64>,
    /// Emit the `Secure` attribute; off only for plain-http local runs.
    pub secure: bool,
}

impl SetCookie {
    /// Render the `Set-Cookie` header value.
    pub fn render(&self) -> String {
        let mut rendered = format!("{}={}; Path=/; HttpOnly", self.name, self.value);
        if self.secure {
            rendered.push_str("; Secure");
        }
        rendered.push_str("; SameSite=Lax");
        if let Some(max_age) = self.max_age {
            rendered.push_str(&format!("; Max-Age={max_age}"));
        }
        rendered
    }
}

/// Cookies replacing the session after the provider rotated it.
pub fn session_cookies(tokens: &SessionTokens, secure: bool) -> Vec<SetCookie> {
    vec![
        SetCookie {
            name: ACCESS_TOKEN_COOKIE,
            value: tokens.access_token.clone(),
            max_age: tokens.expires_in,
            secure,
        },
        SetCookie {
            name: REFRESH_TOKEN_COOKIE,
            value: tokens.refresh_token.clone(),
            max_age: Some(REFRESH_COOKIE_MAX_AGE),
            secure,
        },
    ]
}

/// Append one `Set-Cookie` header per cookie.
pub fn append_cookies(headers: &mut HeaderMap, cookies: &[SetCookie]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.render()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(err) => warn!(cookie = cookie.name, error = %err, "dropping unrenderable cookie"),
        }
    }
}
