//! Per-request authorization. Every application route passes through
//! [`RequestGate::evaluate`] before reaching its handler.
//!
//! | identity | path                         | outcome                               |
//! |----------|------------------------------|---------------------------------------|
//! | none     | public                       | allow                                 |
//! | none     | protected / admin            | redirect to login                     |
//! | present  | public / protected           | allow                                 |
//! | present  | admin self-service           | allow, no role lookup                 |
//! | present  | admin                        | allow for admin/director, else home   |

mod cookies;
pub mod middleware;
mod routes;

use std::{str::FromStr, sync::Arc};

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::{
    config::ConfigError,
    dao::{racha_store::RachaStore, storage::StorageError},
    error::AppError,
    identity::{Credentials, Identity, IdentityProvider, Resolution},
};

pub use self::cookies::{SetCookie, append_cookies, session_cookies};
pub use self::routes::{RouteClass, RouteTable};

/// Privilege level stored in `profiles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    None,
    Admin,
    Director,
}

impl Role {
    /// Map the raw column value; anything unknown or missing is [`Role::None`].
    pub fn from_column(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            Some(role) if role.eq_ignore_ascii_case("director") => Role::Director,
            _ => Role::None,
        }
    }

    /// Whether the role may use the admin area.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Director)
    }
}

/// Identity the gate attached to an allowed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity: Identity,
    /// Only resolved on admin paths; `None` means "not looked up".
    pub role: Option<Role>,
}

impl Caller {
    fn new(identity: Identity) -> Self {
        Self {
            identity,
            role: None,
        }
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("sign in to continue".into()))
    }
}

/// What the gate does when no identity provider is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingConfigPolicy {
    /// Let the request through untouched; nobody can be authenticated anyway.
    #[default]
    Allow,
    /// Answer 503 with a configuration error.
    Reject,
}

impl FromStr for MissingConfigPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(MissingConfigPolicy::Allow),
            "reject" => Ok(MissingConfigPolicy::Reject),
            other => Err(ConfigError::UnknownPolicy(other.to_owned())),
        }
    }
}

/// Reasons the gate answers on behalf of the handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateFailure {
    #[error("identity provider is not configured")]
    MissingConfig,
    #[error("request gate failed: {0}")]
    Internal(String),
}

/// Decision for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Forward to the handler, attaching `caller` to the request when known.
    Allow {
        caller: Option<Caller>,
        cookies: Vec<SetCookie>,
    },
    /// Send the browser elsewhere.
    Redirect {
        location: String,
        cookies: Vec<SetCookie>,
    },
    /// Answer immediately with an error.
    Error(GateFailure),
}

impl GateOutcome {
    fn pass_through() -> Self {
        GateOutcome::Allow {
            caller: None,
            cookies: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
enum GateError {
    #[error("failed to resolve caller role: {0}")]
    RoleLookup(#[source] StorageError),
}

/// Configurable request gate.
pub struct RequestGate {
    identity: Option<Arc<dyn IdentityProvider>>,
    routes: RouteTable,
    on_missing_config: MissingConfigPolicy,
}

impl RequestGate {
    /// Build a gate. `identity` is `None` when the provider configuration is absent.
    pub fn new(
        identity: Option<Arc<dyn IdentityProvider>>,
        routes: RouteTable,
        on_missing_config: MissingConfigPolicy,
    ) -> Self {
        Self {
            identity,
            routes,
            on_missing_config,
        }
    }

    /// Route table used for classification.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Whether an identity provider is installed.
    pub fn is_configured(&self) -> bool {
        self.identity.is_some()
    }

    /// Decide what happens to a request for `path` carrying `credentials`.
    ///
    /// Failures while evaluating turn into [`GateFailure::Internal`]; the gate never
    /// lets an admin request through on error.
    pub async fn evaluate(
        &self,
        store: &dyn RachaStore,
        path: &str,
        credentials: Credentials,
    ) -> GateOutcome {
        match self.try_evaluate(store, path, credentials).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let message = err.to_string();
                error!(path, error = %message, "request gate failed");
                GateOutcome::Error(GateFailure::Internal(message))
            }
        }
    }

    async fn try_evaluate(
        &self,
        store: &dyn RachaStore,
        path: &str,
        credentials: Credentials,
    ) -> Result<GateOutcome, GateError> {
        let Some(provider) = &self.identity else {
            return Ok(match self.on_missing_config {
                MissingConfigPolicy::Allow => {
                    debug!(path, "identity provider not configured; passing through");
                    GateOutcome::pass_through()
                }
                MissingConfigPolicy::Reject => GateOutcome::Error(GateFailure::MissingConfig),
            });
        };

        let resolution = if credentials.is_empty() {
            Resolution::anonymous()
        } else {
            provider.resolve(credentials).await.unwrap_or_else(|err| {
                warn!(path, error = %err, "identity resolution failed; caller is anonymous");
                Resolution::anonymous()
            })
        };

        let cookies = resolution
            .refreshed
            .as_ref()
            .map(|tokens| session_cookies(tokens, self.routes.secure_cookies))
            .unwrap_or_default();
        let class = self.routes.classify(path);

        let Some(identity) = resolution.identity else {
            return Ok(match class {
                RouteClass::Public => GateOutcome::Allow {
                    caller: None,
                    cookies,
                },
                RouteClass::Protected | RouteClass::Admin => GateOutcome::Redirect {
                    location: self.routes.login_path.clone(),
                    cookies,
                },
            });
        };

        if class != RouteClass::Admin || self.routes.is_admin_exempt(path) {
            return Ok(GateOutcome::Allow {
                caller: Some(Caller::new(identity)),
                cookies,
            });
        }

        let role = store
            .find_profile(identity.user_id)
            .await
            .map_err(GateError::RoleLookup)?
            .map(|profile| profile.role())
            .unwrap_or(Role::None);

        if !role.is_staff() {
            debug!(path, user_id = %identity.user_id, ?role, "admin area denied");
            return Ok(GateOutcome::Redirect {
                location: self.routes.home_path.clone(),
                cookies,
            });
        }

        Ok(GateOutcome::Allow {
            caller: Some(Caller {
                identity,
                role: Some(role),
            }),
            cookies,
        })
    }
}
