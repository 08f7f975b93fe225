//! Request authentication.
//!
//! Credentials are read from `Authorization: Bearer <token>` or, if that
//! header is absent, from the `access_token` query parameter. Unknown or
//! missing credentials yield an anonymous `Authentication`; this never fails.
//!
//! Authenticators receive the settings snapshot the caller already holds, so
//! user lookup and the no-token override always come from the same version.

use axum::http::{header, request::Parts};

use crate::config::schema::{UserConfig, WebSettings};

/// Query parameter accepted as an alternative to the Authorization header.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// An authenticated API user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub admin: bool,
}

impl From<&UserConfig> for User {
    fn from(config: &UserConfig) -> Self {
        Self {
            username: config.username.clone(),
            admin: config.admin,
        }
    }
}

/// Result of authenticating a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    pub user: Option<User>,
}

impl Authentication {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// True when the caller holds the admin claim.
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.admin)
    }
}

/// Authenticates raw requests against a settings snapshot.
pub trait SecurityManager: Send + Sync {
    fn authenticate_request(&self, parts: &Parts, settings: &WebSettings) -> Authentication;
}

/// Looks tokens up in the user list of the web settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSecurityManager;

impl TokenSecurityManager {
    pub fn new() -> Self {
        Self
    }
}

fn lookup(settings: &WebSettings, token: &str) -> Option<User> {
    settings
        .users
        .iter()
        .find(|u| !u.token.is_empty() && u.token == token)
        .map(User::from)
}

impl SecurityManager for TokenSecurityManager {
    fn authenticate_request(&self, parts: &Parts, settings: &WebSettings) -> Authentication {
        let Some(token) = extract_token(parts) else {
            return Authentication::anonymous();
        };

        match lookup(settings, token) {
            Some(user) => {
                tracing::debug!(user = %user.username, admin = user.admin, "Request authenticated");
                Authentication::for_user(user)
            }
            None => {
                tracing::warn!(path = %parts.uri.path(), "Unknown API token");
                Authentication::anonymous()
            }
        }
    }
}

/// Find the bearer token in the request, header first.
pub fn extract_token(parts: &Parts) -> Option<&str> {
    let from_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|t| !t.is_empty());

    from_header.or_else(|| {
        parts.uri.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == ACCESS_TOKEN_PARAM && !value.is_empty()).then_some(value)
        })
    })
}
