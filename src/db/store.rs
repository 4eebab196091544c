use crate::db::models::{
    CleanupReport, DbAssignment, DbAttendance, DbCatalogRow, DbDatesheet, DbPublicSignup,
    DbResult, DbStats, DbSubject, DbUser, NewAssignment,
};
use crate::types::principal::Principal;
use serde_json::Value;
use std::future::Future;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Data access used by the gateway handlers.
///
/// Every method is one logical read or mutation. Handlers receive the store
/// through router state, so tests can substitute their own implementation.
pub trait Store: Clone + Send + Sync + 'static {
    /// Resolve an unexpired session token to its principal.
    fn resolve_session(
        &self,
        token: &str,
    ) -> impl Future<Output = StoreResult<Option<Principal>>> + Send;

    /// Delete a session. Returns whether a row was removed.
    fn revoke_session(&self, token: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    fn dashboard_stats(&self) -> impl Future<Output = StoreResult<DbStats>> + Send;

    /// Users with role FACULTY, newest first.
    fn faculty_users(&self) -> impl Future<Output = StoreResult<Vec<DbUser>>> + Send;

    /// Set `approved` on the user matching both `id` and role FACULTY.
    /// `None` when no such user exists.
    fn approve_faculty_user(
        &self,
        id: i64,
    ) -> impl Future<Output = StoreResult<Option<DbUser>>> + Send;

    /// Delete subjects, then courses, then departments in one transaction.
    fn cleanup_catalog(&self) -> impl Future<Output = StoreResult<CleanupReport>> + Send;

    /// Latest attendance records by date.
    fn recent_attendance(
        &self,
        limit: i64,
    ) -> impl Future<Output = StoreResult<Vec<DbAttendance>>> + Send;

    /// Latest results by creation time.
    fn recent_results(&self, limit: i64)
    -> impl Future<Output = StoreResult<Vec<DbResult>>> + Send;

    /// Department/course/subject join, grouped by department then course.
    fn examination_catalog(&self) -> impl Future<Output = StoreResult<Vec<DbCatalogRow>>> + Send;

    fn public_signups(&self) -> impl Future<Output = StoreResult<Vec<DbPublicSignup>>> + Send;

    fn create_public_signup(
        &self,
        payload: &Value,
    ) -> impl Future<Output = StoreResult<DbPublicSignup>> + Send;

    fn datesheet(&self, id: i64) -> impl Future<Output = StoreResult<Option<DbDatesheet>>> + Send;

    fn datesheets(&self) -> impl Future<Output = StoreResult<Vec<DbDatesheet>>> + Send;

    /// Subjects whose course id is in `course_ids`.
    fn subjects_by_courses(
        &self,
        course_ids: &[i64],
    ) -> impl Future<Output = StoreResult<Vec<DbSubject>>> + Send;

    /// Assignments owned by a faculty member, latest due date first.
    fn assignments_for_faculty(
        &self,
        faculty_id: i64,
    ) -> impl Future<Output = StoreResult<Vec<DbAssignment>>> + Send;

    /// Insert an assignment. `None` when the subject does not exist.
    fn create_assignment(
        &self,
        faculty_id: i64,
        assignment: &NewAssignment,
    ) -> impl Future<Output = StoreResult<Option<DbAssignment>>> + Send;

    /// Remove the faculty member's webauthn credentials and clear its token id.
    /// Returns the number of credentials removed.
    fn reset_webauthn(&self, faculty_id: i64) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Attendance of one student, latest first. `None` when the student does not exist.
    fn student_attendance(
        &self,
        student_id: i64,
    ) -> impl Future<Output = StoreResult<Option<Vec<DbAttendance>>>> + Send;
}
