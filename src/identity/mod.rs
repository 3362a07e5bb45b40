//! Caller identity resolution. The service never validates credentials itself; it hands
//! the session cookies to an [`IdentityProvider`] and trusts the answer.

#[cfg(feature = "supabase")]
pub mod supabase;

use std::error::Error;

use axum::http::{HeaderMap, header};
use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

/// Cookie carrying the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";
/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";

/// Authenticated account as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Session tokens extracted from the request cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// Extract session tokens from every `Cookie` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut credentials = Self::default();
        for value in headers.get_all(header::COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            for (name, value) in parse_cookie_pairs(raw) {
                match name {
                    ACCESS_TOKEN_COOKIE => credentials.access_token = Some(value.to_owned()),
                    REFRESH_TOKEN_COOKIE => credentials.refresh_token = Some(value.to_owned()),
                    _ => {}
                }
            }
        }
        credentials
    }

    /// True when no session cookie was sent at all.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Split a `Cookie` header value into `(name, value)` pairs, skipping malformed and
/// empty entries.
fn parse_cookie_pairs(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split(';').filter_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        let value = value.trim().trim_matches('"');
        (!name.is_empty() && !value.is_empty()).then_some((name.trim(), value))
    })
}

/// Tokens issued by the provider after a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: Option<u64>,
}

/// Outcome of resolving a request's credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub identity: Option<Identity>,
    /// Present when the provider rotated the session while validating it.
    pub refreshed: Option<SessionTokens>,
}

impl Resolution {
    /// No valid session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Valid session that needed no rotation.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            refreshed: None,
        }
    }
}

/// Result alias for identity resolution.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Failure talking to the identity provider. An invalid or expired session is not an
/// error; it resolves to [`Resolution::anonymous`].
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl IdentityError {
    /// Construct an unavailable error from any provider failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        IdentityError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Validates session credentials against the external provider.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, credentials: Credentials) -> BoxFuture<'static, IdentityResult<Resolution>>;
}
