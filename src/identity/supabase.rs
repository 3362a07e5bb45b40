//! GoTrue-compatible identity provider (`{url}/auth/v1`).

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::SupabaseConfig,
    identity::{
        Credentials, Identity, IdentityError, IdentityProvider, IdentityResult, Resolution,
        SessionTokens,
    },
};

const USER_ENDPOINT: &str = "user";
const TOKEN_ENDPOINT: &str = "token";

/// Failures that can occur while interacting with the auth endpoints.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build auth client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to an auth endpoint could not be sent.
    #[error("failed to send auth request to `{endpoint}`")]
    RequestSend {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The auth endpoint answered with an unexpected status code.
    #[error("unexpected auth response status {status} for `{endpoint}`")]
    RequestStatus {
        endpoint: &'static str,
        status: StatusCode,
    },
    /// Response payload could not be decoded.
    #[error("failed to decode auth response for `{endpoint}`")]
    DecodeResponse {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl From<AuthError> for IdentityError {
    fn from(err: AuthError) -> Self {
        IdentityError::unavailable(err.to_string(), err)
    }
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for Identity {
    fn from(value: UserPayload) -> Self {
        Self {
            user_id: value.id,
            email: value.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    user: UserPayload,
}

/// [`IdentityProvider`] validating access tokens against the auth server and rotating
/// expired sessions with the refresh token.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    auth_url: Arc<str>,
    anon_key: Arc<str>,
}

impl SupabaseAuth {
    /// Build the HTTP client for the configured project.
    pub fn new(config: &SupabaseConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .build()
            .map_err(|source| AuthError::ClientBuilder { source })?;

        Ok(Self {
            client,
            auth_url: Arc::from(format!("{}/auth/v1", config.url)),
            anon_key: Arc::from(config.anon_key.as_str()),
        })
    }

    /// Fetch the user owning `access_token`; `None` when the token is rejected.
    async fn current_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
        let response = self
            .client
            .get(format!("{}/{}", self.auth_url, USER_ENDPOINT))
            .header("apikey", self.anon_key.as_ref())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| AuthError::RequestSend {
                endpoint: USER_ENDPOINT,
                source,
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => response
                .json::<UserPayload>()
                .await
                .map(|user| Some(user.into()))
                .map_err(|source| AuthError::DecodeResponse {
                    endpoint: USER_ENDPOINT,
                    source,
                }),
            status => Err(AuthError::RequestStatus {
                endpoint: USER_ENDPOINT,
                status,
            }),
        }
    }

    /// Exchange a refresh token for a new session; `None` when the token is rejected.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<TokenPayload>, AuthError> {
        let response = self
            .client
            .post(format!("{}/{}", self.auth_url, TOKEN_ENDPOINT))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", self.anon_key.as_ref())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|source| AuthError::RequestSend {
                endpoint: TOKEN_ENDPOINT,
                source,
            })?;

        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Ok(None),
            status if status.is_success() => response
                .json::<TokenPayload>()
                .await
                .map(Some)
                .map_err(|source| AuthError::DecodeResponse {
                    endpoint: TOKEN_ENDPOINT,
                    source,
                }),
            status => Err(AuthError::RequestStatus {
                endpoint: TOKEN_ENDPOINT,
                status,
            }),
        }
    }
}

impl IdentityProvider for SupabaseAuth {
    fn resolve(&self, credentials: Credentials) -> BoxFuture<'static, IdentityResult<Resolution>> {
        let auth = self.clone();
        Box::pin(async move {
            if let Some(access_token) = credentials.access_token.as_deref() {
                if let Some(identity) = auth.current_user(access_token).await? {
                    return Ok(Resolution::authenticated(identity));
                }
                debug!("access token rejected; trying refresh");
            }

            let Some(refresh_token) = credentials.refresh_token.as_deref() else {
                return Ok(Resolution::anonymous());
            };

            match auth.refresh(refresh_token).await? {
                Some(session) => Ok(Resolution {
                    identity: Some(session.user.into()),
                    refreshed: Some(SessionTokens {
                        access_token: session.access_token,
                        refresh_token: session.refresh_token,
                        expires_in: session.expires_in,
                    }),
                }),
                None => Ok(Resolution::anonymous()),
            }
        })
    }
}
