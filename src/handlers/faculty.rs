use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use crate::db::Store;
use crate::db::models::NewAssignment;
use crate::error::{GatewayError, OperationExt};
use crate::router::GatewayState;
use crate::types::principal::Principal;
use crate::types::views::{AssignmentView, SuccessResponse};

fn faculty_id(principal: &Principal) -> Result<i64, GatewayError> {
    principal
        .faculty_id
        .ok_or(GatewayError::NotFound("Faculty profile not found"))
}

/// GET /faculty/assignments/list -> the caller's own assignments.
pub async fn list_assignments<S: Store>(
    State(state): State<GatewayState<S>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<AssignmentView>>, GatewayError> {
    let faculty_id = faculty_id(&principal)?;
    let rows = state
        .store
        .assignments_for_faculty(faculty_id)
        .await
        .during("Fetch assignments")?;
    Ok(Json(rows.into_iter().map(AssignmentView::from).collect()))
}

/// POST /faculty/assignments
pub async fn create_assignment<S: Store>(
    State(state): State<GatewayState<S>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<NewAssignment>, JsonRejection>,
) -> Result<(StatusCode, Json<AssignmentView>), GatewayError> {
    let faculty_id = faculty_id(&principal)?;
    let Json(mut assignment) = body.map_err(|e| GatewayError::Validation(e.body_text()))?;
    assignment.title = assignment.title.trim().to_string();
    if assignment.title.is_empty() {
        return Err(GatewayError::Validation("Title is required".to_string()));
    }
    if assignment.subject_id <= 0 {
        return Err(GatewayError::Validation(format!(
            "Invalid id: {}",
            assignment.subject_id
        )));
    }

    let row = state
        .store
        .create_assignment(faculty_id, &assignment)
        .await
        .during("Create assignment")?
        .ok_or(GatewayError::NotFound("Subject not found"))?;
    info!(faculty_id, assignment_id = row.id, "assignment created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// POST /faculty/webauthn/reset -> clears the caller's own passkeys.
pub async fn reset_webauthn<S: Store>(
    State(state): State<GatewayState<S>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<SuccessResponse>, GatewayError> {
    let faculty_id = faculty_id(&principal)?;
    let removed = state
        .store
        .reset_webauthn(faculty_id)
        .await
        .during("Reset webauthn")?;
    info!(faculty_id, removed, "webauthn credentials reset");
    Ok(Json(SuccessResponse { success: true }))
}
