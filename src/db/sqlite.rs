use crate::db::models::{
    CleanupReport, DbAssignment, DbAttendance, DbCatalogRow, DbDatesheet, DbPublicSignup,
    DbResult, DbSessionPrincipal, DbStats, DbSubject, DbUser, NewAssignment,
};
use crate::db::schema::SQLITE_INIT;
use crate::db::store::{Store, StoreResult};
use crate::types::principal::{Principal, Role};
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

const ATTENDANCE_SELECT: &str = r#"
    SELECT a.id, a.date, a.status,
           st.id AS student_id, st.name AS student_name,
           sb.id AS subject_id, sb.name AS subject_name, sb.code AS subject_code
    FROM attendance a
    JOIN students st ON st.id = a.student_id
    JOIN subjects sb ON sb.id = a.subject_id
"#;

const ASSIGNMENT_SELECT: &str = r#"
    SELECT a.id, a.faculty_id, a.title, a.description, a.due_date, a.created_at,
           sb.id AS subject_id, sb.name AS subject_name, sb.code AS subject_code
    FROM assignments a
    JOIN subjects sb ON sb.id = a.subject_id
"#;

const DATESHEET_SELECT: &str = r#"
    SELECT ds.id, ds.title, ds.semester, ds.created_at,
           d.id AS department_id, d.name AS department_name,
           c.id AS course_id, c.name AS course_name
    FROM datesheets ds
    JOIN departments d ON d.id = ds.department_id
    JOIN courses c ON c.id = ds.course_id
"#;

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool with foreign keys enforced. In-memory databases (`:memory:`
    /// or `mode=memory`) keep a single connection alive forever, since each
    /// connection is its own database.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(connect_opts)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(connect_opts)
                .await?
        };
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> StoreResult<()> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }
}

impl Store for SqliteStore {
    async fn resolve_session(&self, token: &str) -> StoreResult<Option<Principal>> {
        let row: Option<DbSessionPrincipal> = sqlx::query_as(
            r#"SELECT u.id AS user_id, u.role, u.approved, f.id AS faculty_id
               FROM sessions s
               JOIN users u ON u.id = s.user_id
               LEFT JOIN faculty f ON f.user_id = u.id
               WHERE s.token = ? AND julianday(s.expires_at) > julianday('now')"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Principal::try_from).transpose()
    }

    async fn revoke_session(&self, token: &str) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn dashboard_stats(&self) -> StoreResult<DbStats> {
        // A "class" is a subject taught within a course.
        sqlx::query_as(
            r#"SELECT
                (SELECT COUNT(*) FROM students) AS total_students,
                (SELECT COUNT(*) FROM faculty) AS total_faculty,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM subjects) AS total_classes"#,
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn faculty_users(&self) -> StoreResult<Vec<DbUser>> {
        sqlx::query_as(
            r#"SELECT id, email, name, role, approved, created_at
               FROM users WHERE role = ?
               ORDER BY created_at DESC, id DESC"#,
        )
        .bind(Role::Faculty.as_str())
        .fetch_all(&self.pool)
        .await
    }

    async fn approve_faculty_user(&self, id: i64) -> StoreResult<Option<DbUser>> {
        sqlx::query_as(
            r#"UPDATE users SET approved = 1
               WHERE id = ? AND role = ?
               RETURNING id, email, name, role, approved, created_at"#,
        )
        .bind(id)
        .bind(Role::Faculty.as_str())
        .fetch_optional(&self.pool)
        .await
    }

    async fn cleanup_catalog(&self) -> StoreResult<CleanupReport> {
        let mut tx = self.pool.begin().await?;

        let subjects = sqlx::query("DELETE FROM subjects")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        info!(deleted = subjects, "cleanup: subjects removed");

        let courses = sqlx::query("DELETE FROM courses")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        info!(deleted = courses, "cleanup: courses removed");

        let departments = sqlx::query("DELETE FROM departments")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        info!(deleted = departments, "cleanup: departments removed");

        tx.commit().await?;
        Ok(CleanupReport {
            subjects,
            courses,
            departments,
        })
    }

    async fn recent_attendance(&self, limit: i64) -> StoreResult<Vec<DbAttendance>> {
        let sql = format!("{ATTENDANCE_SELECT} ORDER BY a.date DESC, a.id DESC LIMIT ?");
        sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    async fn recent_results(&self, limit: i64) -> StoreResult<Vec<DbResult>> {
        sqlx::query_as(
            r#"SELECT r.id, r.marks, r.grade, r.created_at,
                      st.id AS student_id, st.name AS student_name,
                      sb.id AS subject_id, sb.name AS subject_name, sb.code AS subject_code
               FROM results r
               JOIN students st ON st.id = r.student_id
               JOIN subjects sb ON sb.id = r.subject_id
               ORDER BY r.created_at DESC, r.id DESC
               LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn examination_catalog(&self) -> StoreResult<Vec<DbCatalogRow>> {
        sqlx::query_as(
            r#"SELECT d.id AS department_id, d.name AS department_name,
                      c.id AS course_id, c.name AS course_name,
                      s.id AS subject_id, s.name AS subject_name,
                      s.code AS subject_code, s.semester AS subject_semester
               FROM departments d
               LEFT JOIN courses c ON c.department_id = d.id
               LEFT JOIN subjects s ON s.course_id = c.id
               ORDER BY d.name, d.id, c.name, c.id, s.semester, s.name"#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn public_signups(&self) -> StoreResult<Vec<DbPublicSignup>> {
        sqlx::query_as(
            r#"SELECT id, created_at, payload FROM public_signups
               ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_public_signup(&self, payload: &Value) -> StoreResult<DbPublicSignup> {
        let payload_json =
            serde_json::to_string(payload).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query_as(
            r#"INSERT INTO public_signups (created_at, payload) VALUES (?, ?)
               RETURNING id, created_at, payload"#,
        )
        .bind(Utc::now())
        .bind(payload_json)
        .fetch_one(&self.pool)
        .await
    }

    async fn datesheet(&self, id: i64) -> StoreResult<Option<DbDatesheet>> {
        let sql = format!("{DATESHEET_SELECT} WHERE ds.id = ?");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn datesheets(&self) -> StoreResult<Vec<DbDatesheet>> {
        let sql = format!("{DATESHEET_SELECT} ORDER BY ds.created_at DESC, ds.id DESC");
        sqlx::query_as(&sql).fetch_all(&self.pool).await
    }

    async fn subjects_by_courses(&self, course_ids: &[i64]) -> StoreResult<Vec<DbSubject>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, code, course_id, semester FROM subjects WHERE course_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in course_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY course_id, semester, id");
        debug!(count = course_ids.len(), "querying subjects by course ids");
        qb.build_query_as().fetch_all(&self.pool).await
    }

    async fn assignments_for_faculty(&self, faculty_id: i64) -> StoreResult<Vec<DbAssignment>> {
        let sql = format!(
            "{ASSIGNMENT_SELECT} WHERE a.faculty_id = ? ORDER BY a.due_date DESC, a.id DESC"
        );
        sqlx::query_as(&sql)
            .bind(faculty_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn create_assignment(
        &self,
        faculty_id: i64,
        assignment: &NewAssignment,
    ) -> StoreResult<Option<DbAssignment>> {
        // Guarded insert: no row is written when the subject is missing.
        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"INSERT INTO assignments (faculty_id, subject_id, title, description, due_date, created_at)
               SELECT ?, id, ?, ?, ?, ? FROM subjects WHERE id = ?
               RETURNING id"#,
        )
        .bind(faculty_id)
        .bind(&assignment.title)
        .bind(&assignment.description)
        .bind(assignment.due_date)
        .bind(Utc::now())
        .bind(assignment.subject_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id,)) = inserted else {
            return Ok(None);
        };
        let sql = format!("{ASSIGNMENT_SELECT} WHERE a.id = ?");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn reset_webauthn(&self, faculty_id: i64) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM webauthn_credentials WHERE faculty_id = ?")
            .bind(faculty_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("UPDATE faculty SET token_id = NULL WHERE id = ?")
            .bind(faculty_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn student_attendance(&self, student_id: i64) -> StoreResult<Option<Vec<DbAttendance>>> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM students WHERE id = ?")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }
        let sql = format!(
            "{ATTENDANCE_SELECT} WHERE a.student_id = ? ORDER BY a.date DESC, a.id DESC"
        );
        let rows = sqlx::query_as(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_are_detected() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite:file:campus?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite:campus.sqlite"));
        assert!(!is_in_memory("sqlite:///var/lib/campus/memory.sqlite"));
    }

    #[tokio::test]
    async fn mode_memory_url_shares_one_database() {
        let store = SqliteStore::connect("sqlite:file:campus_mode_memory?mode=memory", 4)
            .await
            .unwrap();
        store.init_schema().await.unwrap();

        let stats = store.dashboard_stats().await.unwrap();
        assert_eq!(stats, DbStats::default());
    }
}
