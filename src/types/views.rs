//! JSON projections returned by the gateway routes.
//!
//! Rows from `db::models` are converted here; field names are camelCase on
//! the wire.

use crate::db::models::{
    CleanupReport, DbAssignment, DbAttendance, DbCatalogRow, DbDatesheet, DbPublicSignup,
    DbResult, DbStats, DbSubject, DbUser,
};
use crate::types::principal::Role;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_students: i64,
    pub total_faculty: i64,
    pub total_courses: i64,
    pub total_classes: i64,
}

impl From<DbStats> for StatsView {
    fn from(s: DbStats) -> Self {
        Self {
            total_students: s.total_students,
            total_faculty: s.total_faculty,
            total_courses: s.total_courses,
            total_classes: s.total_classes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for UserView {
    fn from(u: DbUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            approved: u.approved,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub deleted: CleanupCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CleanupCounts {
    pub subjects: u64,
    pub courses: u64,
    pub departments: u64,
}

impl From<CleanupReport> for CleanupResponse {
    fn from(r: CleanupReport) -> Self {
        Self {
            success: true,
            message: "Test data cleaned up".to_string(),
            deleted: CleanupCounts {
                subjects: r.subjects,
                courses: r.courses,
                departments: r.departments,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectRef {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub id: i64,
    pub date: NaiveDate,
    pub status: String,
    pub student: StudentRef,
    pub subject: SubjectRef,
}

impl From<DbAttendance> for AttendanceView {
    fn from(a: DbAttendance) -> Self {
        Self {
            id: a.id,
            date: a.date,
            status: a.status,
            student: StudentRef {
                id: a.student_id,
                name: a.student_name,
            },
            subject: SubjectRef {
                id: a.subject_id,
                name: a.subject_name,
                code: a.subject_code,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub id: i64,
    pub marks: f64,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
    pub student: StudentRef,
    pub subject: SubjectRef,
}

impl From<DbResult> for ResultView {
    fn from(r: DbResult) -> Self {
        Self {
            id: r.id,
            marks: r.marks,
            grade: r.grade,
            created_at: r.created_at,
            student: StudentRef {
                id: r.student_id,
                name: r.student_name,
            },
            subject: SubjectRef {
                id: r.subject_id,
                name: r.subject_name,
                code: r.subject_code,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub course_id: i64,
    pub semester: i64,
}

impl From<DbSubject> for SubjectView {
    fn from(s: DbSubject) -> Self {
        Self {
            id: s.id,
            name: s.name,
            code: s.code,
            course_id: s.course_id,
            semester: s.semester,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSubject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub semester: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogCourse {
    pub id: i64,
    pub name: String,
    pub subjects: Vec<CatalogSubject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogDepartment {
    pub id: i64,
    pub name: String,
    pub courses: Vec<CatalogCourse>,
}

/// Fold flat join rows into department → course → subject nesting.
///
/// Rows must arrive grouped by department, then by course; nesting keeps the
/// incoming order. Subjects are sorted by semester then name within a course.
pub fn nest_catalog(rows: Vec<DbCatalogRow>) -> Vec<CatalogDepartment> {
    let mut departments: Vec<CatalogDepartment> = Vec::new();

    for row in rows {
        if departments.last().map(|d| d.id) != Some(row.department_id) {
            departments.push(CatalogDepartment {
                id: row.department_id,
                name: row.department_name,
                courses: Vec::new(),
            });
        }
        let Some(department) = departments.last_mut() else {
            continue;
        };

        let (Some(course_id), Some(course_name)) = (row.course_id, row.course_name) else {
            continue;
        };
        if department.courses.last().map(|c| c.id) != Some(course_id) {
            department.courses.push(CatalogCourse {
                id: course_id,
                name: course_name,
                subjects: Vec::new(),
            });
        }
        let Some(course) = department.courses.last_mut() else {
            continue;
        };

        if let (Some(id), Some(name), Some(code), Some(semester)) = (
            row.subject_id,
            row.subject_name,
            row.subject_code,
            row.subject_semester,
        ) {
            course.subjects.push(CatalogSubject {
                id,
                name,
                code,
                semester,
            });
        }
    }

    for course in departments.iter_mut().flat_map(|d| d.courses.iter_mut()) {
        course
            .subjects
            .sort_by(|a, b| a.semester.cmp(&b.semester).then_with(|| a.name.cmp(&b.name)));
    }
    departments
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSignupView {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub payload: Value,
}

impl From<DbPublicSignup> for PublicSignupView {
    fn from(s: DbPublicSignup) -> Self {
        // Rows are written by this service as serialized objects; anything
        // else is surfaced verbatim as a string.
        let payload = serde_json::from_str(&s.payload).unwrap_or(Value::String(s.payload));
        Self {
            id: s.id,
            created_at: s.created_at,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSignupView {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesheetView {
    pub id: i64,
    pub title: String,
    pub semester: i64,
    pub created_at: DateTime<Utc>,
    pub department_id: i64,
    pub department_name: String,
    pub course_id: i64,
    pub course_name: String,
}

impl From<DbDatesheet> for DatesheetView {
    fn from(d: DbDatesheet) -> Self {
        Self {
            id: d.id,
            title: d.title,
            semester: d.semester,
            created_at: d.created_at,
            department_id: d.department_id,
            department_name: d.department_name,
            course_id: d.course_id,
            course_name: d.course_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub subject: SubjectRef,
}

impl From<DbAssignment> for AssignmentView {
    fn from(a: DbAssignment) -> Self {
        Self {
            id: a.id,
            title: a.title,
            description: a.description,
            due_date: a.due_date,
            created_at: a.created_at,
            subject: SubjectRef {
                id: a.subject_id,
                name: a.subject_name,
                code: a.subject_code,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    pub user_id: i64,
    pub role: Role,
    pub approved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        dept: (i64, &str),
        course: Option<(i64, &str)>,
        subject: Option<(i64, &str, i64)>,
    ) -> DbCatalogRow {
        DbCatalogRow {
            department_id: dept.0,
            department_name: dept.1.to_string(),
            course_id: course.map(|c| c.0),
            course_name: course.map(|c| c.1.to_string()),
            subject_id: subject.map(|s| s.0),
            subject_name: subject.map(|s| s.1.to_string()),
            subject_code: subject.map(|s| format!("C{}", s.0)),
            subject_semester: subject.map(|s| s.2),
        }
    }

    #[test]
    fn nest_catalog_groups_and_sorts_by_semester() {
        let rows = vec![
            row((1, "Science"), Some((10, "Physics")), Some((100, "Optics", 3))),
            row((1, "Science"), Some((10, "Physics")), Some((101, "Mechanics", 1))),
            row((1, "Science"), Some((11, "Chemistry")), None),
            row((2, "Arts"), None, None),
        ];

        let nested = nest_catalog(rows);

        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].courses.len(), 2);
        let physics = &nested[0].courses[0];
        assert_eq!(
            physics.subjects.iter().map(|s| s.semester).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(nested[0].courses[1].subjects.is_empty());
        assert!(nested[1].courses.is_empty());
    }

    #[test]
    fn signup_payload_falls_back_to_string() {
        let view = PublicSignupView::from(DbPublicSignup {
            id: 1,
            created_at: Utc::now(),
            payload: "not json".to_string(),
        });
        assert_eq!(view.payload, Value::String("not json".to_string()));
    }
}
