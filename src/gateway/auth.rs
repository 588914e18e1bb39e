use crate::config::{AuthConfig, AuthUserConfig, ADMIN_ROLE};
use crate::gateway::error::ApiError;
use crate::gateway::server::GatewayState;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

// ============================================================================
// Types
// ============================================================================

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// Token table built from the auth configuration.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAuth {
    users: Vec<AuthUserConfig>,
}

impl ResolvedAuth {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            users: config
                .users
                .iter()
                .filter(|u| !u.token.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Resolve the identity owning `token`.
    ///
    /// Every configured token is compared so timing does not reveal which
    /// entry matched.
    pub fn authenticate(&self, token: &str) -> Option<Identity> {
        let mut found = None;
        for user in &self.users {
            if safe_equal(&user.token, token) && found.is_none() {
                found = Some(Identity {
                    user_id: user.user_id.clone(),
                    roles: user.roles.clone(),
                });
            }
        }
        found
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

// ============================================================================
// Middleware & Extractors
// ============================================================================

/// Attach the caller's [`Identity`] to the request when a valid bearer token
/// is presented. Never rejects; handlers decide what they require.
pub async fn authenticate(
    State(state): State<GatewayState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token);

    if let Some(token) = token {
        match state.auth.authenticate(token) {
            Some(identity) => {
                debug!(user = %identity.user_id, "request authenticated");
                req.extensions_mut().insert(identity);
            }
            None => debug!("bearer token rejected"),
        }
    }

    next.run(req).await
}

/// Reject callers lacking the administrator role.
pub async fn require_admin(
    Auth(identity): Auth,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !identity.is_admin() {
        warn!(
            user = %identity.user_id,
            roles = ?identity.roles,
            "Admin permission denied - {} role required",
            ADMIN_ROLE
        );
        return Err(ApiError::Forbidden("Administrator role required".to_string()));
    }

    Ok(next.run(req).await)
}

/// Extractor for the authenticated caller; answers 401 when there is none.
#[derive(Debug, Clone)]
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Auth)
            .ok_or(ApiError::Unauthorized)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Timing-safe string comparison.
fn safe_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Extract bearer token from an Authorization header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    match (header.get(..7), header.get(7..)) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer ") => {
            let token = token.trim();
            (!token.is_empty()).then_some(token)
        }
        _ => None,
    }
}
