use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt};
use tracing::debug;

use crate::db::Store;
use crate::error::{GatewayError, OperationExt};
use crate::router::GatewayState;
use crate::types::principal::{Principal, Role, SessionToken};

/// What a route group demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any resolved principal.
    Session,
    /// Principal with exactly this role. Faculty must also be approved.
    Role(Role),
}

/// Pull the session token from the request.
/// Accepts either:
/// - Header: `Authorization: Bearer <token>`
/// - Cookie: the configured session cookie
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        let token = bearer.token().trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check a resolved principal against the access rule.
pub fn check_access(principal: Option<&Principal>, access: Access) -> Result<(), GatewayError> {
    let Some(principal) = principal else {
        return Err(GatewayError::Unauthorized);
    };
    match access {
        Access::Session => Ok(()),
        Access::Role(required) if principal.role != required => Err(GatewayError::Unauthorized),
        Access::Role(Role::Faculty) if !principal.approved => {
            Err(GatewayError::Forbidden("Account pending approval"))
        }
        Access::Role(_) => Ok(()),
    }
}

/// Resolve and authorize the caller, then stash the principal and its token
/// in the request extensions for the handler.
async fn authorize<S: Store>(
    state: &GatewayState<S>,
    req: &mut Request,
    access: Access,
) -> Result<(), GatewayError> {
    let Some(token) = session_token(req.headers(), &state.session_cookie) else {
        debug!(path = %req.uri().path(), "request without session token");
        return Err(GatewayError::Unauthorized);
    };

    let principal = state
        .store
        .resolve_session(&token)
        .await
        .during("Resolve session")?;

    check_access(principal.as_ref(), access).inspect_err(|e| {
        debug!(path = %req.uri().path(), reason = %e, "request rejected");
    })?;

    if let Some(principal) = principal {
        req.extensions_mut().insert(principal);
    }
    req.extensions_mut().insert(SessionToken(token));
    Ok(())
}

pub async fn require_admin<S: Store>(
    State(state): State<GatewayState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    authorize(&state, &mut req, Access::Role(Role::Admin)).await?;
    Ok(next.run(req).await)
}

pub async fn require_faculty<S: Store>(
    State(state): State<GatewayState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    authorize(&state, &mut req, Access::Role(Role::Faculty)).await?;
    Ok(next.run(req).await)
}

pub async fn require_session<S: Store>(
    State(state): State<GatewayState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    authorize(&state, &mut req, Access::Session).await?;
    Ok(next.run(req).await)
}
