use axum::{Extension, Json, extract::State};
use tracing::info;

use crate::db::Store;
use crate::error::{GatewayError, OperationExt};
use crate::router::GatewayState;
use crate::types::principal::{Principal, SessionToken};
use crate::types::views::{MeView, SuccessResponse};

/// GET /auth/me
pub async fn me(Extension(principal): Extension<Principal>) -> Json<MeView> {
    Json(MeView {
        user_id: principal.user_id,
        role: principal.role,
        approved: principal.approved,
    })
}

/// DELETE /auth/session -> revoke the token this request was made with.
pub async fn logout<S: Store>(
    State(state): State<GatewayState<S>>,
    Extension(principal): Extension<Principal>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<Json<SuccessResponse>, GatewayError> {
    let revoked = state
        .store
        .revoke_session(&token)
        .await
        .during("Revoke session")?;
    info!(user_id = principal.user_id, revoked, "session revoked");
    Ok(Json(SuccessResponse { success: true }))
}
