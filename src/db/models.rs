use crate::types::principal::{Principal, Role};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Session joined with its user and, for faculty, the faculty profile.
#[derive(Debug, Clone, FromRow)]
pub struct DbSessionPrincipal {
    pub user_id: i64,
    pub role: String,
    pub approved: bool,
    pub faculty_id: Option<i64>,
}

impl TryFrom<DbSessionPrincipal> for Principal {
    type Error = sqlx::Error;

    fn try_from(row: DbSessionPrincipal) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Principal {
            user_id: row.user_id,
            role,
            approved: row.approved,
            faculty_id: row.faculty_id,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct DbStats {
    pub total_students: i64,
    pub total_faculty: i64,
    pub total_courses: i64,
    pub total_classes: i64,
}

/// Row counts removed by the catalog cleanup, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub subjects: u64,
    pub courses: u64,
    pub departments: u64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbSubject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub course_id: i64,
    pub semester: i64,
}

/// Attendance joined with the student name and subject name/code.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAttendance {
    pub id: i64,
    pub date: NaiveDate,
    pub status: String,
    pub student_id: i64,
    pub student_name: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
}

/// Result joined with the student name and subject name/code.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbResult {
    pub id: i64,
    pub marks: f64,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
    pub student_id: i64,
    pub student_name: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
}

/// One row of `departments LEFT JOIN courses LEFT JOIN subjects`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbCatalogRow {
    pub department_id: i64,
    pub department_name: String,
    pub course_id: Option<i64>,
    pub course_name: Option<String>,
    pub subject_id: Option<i64>,
    pub subject_name: Option<String>,
    pub subject_code: Option<String>,
    pub subject_semester: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbPublicSignup {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbDatesheet {
    pub id: i64,
    pub title: String,
    pub semester: i64,
    pub created_at: DateTime<Utc>,
    pub department_id: i64,
    pub department_name: String,
    pub course_id: i64,
    pub course_name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAssignment {
    pub id: i64,
    pub faculty_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
}

/// Insert payload for an assignment; the owning faculty id comes from the caller's session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub subject_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: NaiveDate,
}
