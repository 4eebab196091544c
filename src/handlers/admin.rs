use axum::{Json, extract::State};
use tracing::info;

use crate::db::Store;
use crate::error::{GatewayError, OperationExt};
use crate::middleware::ValidId;
use crate::router::GatewayState;
use crate::types::views::{
    AttendanceView, CatalogDepartment, CleanupResponse, DatesheetView, PublicSignupView,
    ResultView, StatsView, UserResponse, UserView, UsersResponse, nest_catalog,
};

/// How many rows the dashboard "latest" panels show.
pub const RECENT_LIMIT: i64 = 5;

/// GET /admin/stats
pub async fn stats<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<StatsView>, GatewayError> {
    let stats = state
        .store
        .dashboard_stats()
        .await
        .during("Fetch stats")?;
    Ok(Json(stats.into()))
}

/// GET /admin/users -> faculty accounts, newest first.
pub async fn faculty_users<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<UsersResponse>, GatewayError> {
    let users = state
        .store
        .faculty_users()
        .await
        .during("Fetch users")?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserView::from).collect(),
    }))
}

/// POST /admin/users/{id}/approve
pub async fn approve_user<S: Store>(
    State(state): State<GatewayState<S>>,
    ValidId(id): ValidId,
) -> Result<Json<UserResponse>, GatewayError> {
    let user = state
        .store
        .approve_faculty_user(id)
        .await
        .during("Approve user")?
        .ok_or(GatewayError::NotFound("User not found"))?;
    info!(user_id = user.id, "faculty user approved");
    Ok(Json(UserResponse { user: user.into() }))
}

/// DELETE /admin/cleanup
pub async fn cleanup<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<CleanupResponse>, GatewayError> {
    let report = state
        .store
        .cleanup_catalog()
        .await
        .during("Cleanup")?;
    info!(
        subjects = report.subjects,
        courses = report.courses,
        departments = report.departments,
        "catalog cleanup completed"
    );
    Ok(Json(report.into()))
}

/// GET /admin/attendance
pub async fn recent_attendance<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<Vec<AttendanceView>>, GatewayError> {
    let rows = state
        .store
        .recent_attendance(RECENT_LIMIT)
        .await
        .during("Fetch attendance")?;
    Ok(Json(rows.into_iter().map(AttendanceView::from).collect()))
}

/// GET /admin/results
pub async fn recent_results<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<Vec<ResultView>>, GatewayError> {
    let rows = state
        .store
        .recent_results(RECENT_LIMIT)
        .await
        .during("Fetch results")?;
    Ok(Json(rows.into_iter().map(ResultView::from).collect()))
}

/// GET /admin/examination
pub async fn examination<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<Vec<CatalogDepartment>>, GatewayError> {
    let rows = state
        .store
        .examination_catalog()
        .await
        .during("Fetch examination data")?;
    Ok(Json(nest_catalog(rows)))
}

/// GET /admin/publicsignup
pub async fn public_signups<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<Vec<PublicSignupView>>, GatewayError> {
    let rows = state
        .store
        .public_signups()
        .await
        .during("Fetch public signups")?;
    Ok(Json(rows.into_iter().map(PublicSignupView::from).collect()))
}

/// GET /admin/datesheets
pub async fn datesheets<S: Store>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<Vec<DatesheetView>>, GatewayError> {
    let rows = state
        .store
        .datesheets()
        .await
        .during("Fetch datesheets")?;
    Ok(Json(rows.into_iter().map(DatesheetView::from).collect()))
}

/// GET /admin/datesheets/{id}
pub async fn datesheet<S: Store>(
    State(state): State<GatewayState<S>>,
    ValidId(id): ValidId,
) -> Result<Json<DatesheetView>, GatewayError> {
    let row = state
        .store
        .datesheet(id)
        .await
        .during("Fetch datesheet")?
        .ok_or(GatewayError::NotFound("Datesheet not found"))?;
    Ok(Json(row.into()))
}

/// GET /admin/students/{id}/attendance
pub async fn student_attendance<S: Store>(
    State(state): State<GatewayState<S>>,
    ValidId(id): ValidId,
) -> Result<Json<Vec<AttendanceView>>, GatewayError> {
    let rows = state
        .store
        .student_attendance(id)
        .await
        .during("Fetch student attendance")?
        .ok_or(GatewayError::NotFound("Student not found"))?;
    Ok(Json(rows.into_iter().map(AttendanceView::from).collect()))
}
