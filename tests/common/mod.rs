#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use campus_gateway::db::StoreResult;
use campus_gateway::db::models::{
    CleanupReport, DbAssignment, DbAttendance, DbCatalogRow, DbDatesheet, DbPublicSignup,
    DbResult, DbStats, DbSubject, DbUser, NewAssignment,
};
use campus_gateway::types::Principal;
use campus_gateway::{GatewayState, SqliteStore, Store, gateway_router};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use tower::ServiceExt;

pub const COOKIE: &str = "campus_session";

/// Store wrapper that records every call and can be switched to fail all
/// data queries (session resolution keeps working).
#[derive(Clone)]
pub struct CountingStore {
    pub inner: SqliteStore,
    calls: Arc<Mutex<Vec<&'static str>>>,
    failing: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn calls(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    pub fn fail_queries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn record(&self, name: &'static str) -> StoreResult<()> {
        self.calls.lock().unwrap().push(name);
        if name != "resolve_session" && self.failing.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

impl Store for CountingStore {
    async fn resolve_session(&self, token: &str) -> StoreResult<Option<Principal>> {
        self.record("resolve_session")?;
        self.inner.resolve_session(token).await
    }

    async fn revoke_session(&self, token: &str) -> StoreResult<bool> {
        self.record("revoke_session")?;
        self.inner.revoke_session(token).await
    }

    async fn dashboard_stats(&self) -> StoreResult<DbStats> {
        self.record("dashboard_stats")?;
        self.inner.dashboard_stats().await
    }

    async fn faculty_users(&self) -> StoreResult<Vec<DbUser>> {
        self.record("faculty_users")?;
        self.inner.faculty_users().await
    }

    async fn approve_faculty_user(&self, id: i64) -> StoreResult<Option<DbUser>> {
        self.record("approve_faculty_user")?;
        self.inner.approve_faculty_user(id).await
    }

    async fn cleanup_catalog(&self) -> StoreResult<CleanupReport> {
        self.record("cleanup_catalog")?;
        self.inner.cleanup_catalog().await
    }

    async fn recent_attendance(&self, limit: i64) -> StoreResult<Vec<DbAttendance>> {
        self.record("recent_attendance")?;
        self.inner.recent_attendance(limit).await
    }

    async fn recent_results(&self, limit: i64) -> StoreResult<Vec<DbResult>> {
        self.record("recent_results")?;
        self.inner.recent_results(limit).await
    }

    async fn examination_catalog(&self) -> StoreResult<Vec<DbCatalogRow>> {
        self.record("examination_catalog")?;
        self.inner.examination_catalog().await
    }

    async fn public_signups(&self) -> StoreResult<Vec<DbPublicSignup>> {
        self.record("public_signups")?;
        self.inner.public_signups().await
    }

    async fn create_public_signup(&self, payload: &Value) -> StoreResult<DbPublicSignup> {
        self.record("create_public_signup")?;
        self.inner.create_public_signup(payload).await
    }

    async fn datesheet(&self, id: i64) -> StoreResult<Option<DbDatesheet>> {
        self.record("datesheet")?;
        self.inner.datesheet(id).await
    }

    async fn datesheets(&self) -> StoreResult<Vec<DbDatesheet>> {
        self.record("datesheets")?;
        self.inner.datesheets().await
    }

    async fn subjects_by_courses(&self, course_ids: &[i64]) -> StoreResult<Vec<DbSubject>> {
        self.record("subjects_by_courses")?;
        self.inner.subjects_by_courses(course_ids).await
    }

    async fn assignments_for_faculty(&self, faculty_id: i64) -> StoreResult<Vec<DbAssignment>> {
        self.record("assignments_for_faculty")?;
        self.inner.assignments_for_faculty(faculty_id).await
    }

    async fn create_assignment(
        &self,
        faculty_id: i64,
        assignment: &NewAssignment,
    ) -> StoreResult<Option<DbAssignment>> {
        self.record("create_assignment")?;
        self.inner.create_assignment(faculty_id, assignment).await
    }

    async fn reset_webauthn(&self, faculty_id: i64) -> StoreResult<u64> {
        self.record("reset_webauthn")?;
        self.inner.reset_webauthn(faculty_id).await
    }

    async fn student_attendance(&self, student_id: i64) -> StoreResult<Option<Vec<DbAttendance>>> {
        self.record("student_attendance")?;
        self.inner.student_attendance(student_id).await
    }
}

pub struct Fixture {
    pub store: CountingStore,
    pub app: Router,
}

impl Fixture {
    pub async fn new() -> Self {
        let inner = SqliteStore::connect("sqlite::memory:", 1)
            .await
            .expect("failed to open in-memory sqlite");
        inner.init_schema().await.expect("failed to init schema");
        let store = CountingStore {
            inner,
            calls: Arc::default(),
            failing: Arc::default(),
        };
        let app = gateway_router(GatewayState::new(store.clone(), COOKIE));
        Self { store, app }
    }

    pub fn pool(&self) -> &campus_gateway::db::SqlitePool {
        self.store.inner.pool()
    }

    /// Send a request with an optional bearer token and JSON body; returns
    /// the status and the parsed JSON body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let req = builder.body(body).expect("failed to build request");
        self.dispatch(req).await
    }

    pub async fn dispatch(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.app.clone().oneshot(req).await.expect("request failed");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not json")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    // ---- seeding ----

    pub async fn user(&self, email: &str, role: &str, approved: bool) -> i64 {
        self.user_at(email, role, approved, Utc::now()).await
    }

    pub async fn user_at(
        &self,
        email: &str,
        role: &str,
        approved: bool,
        created_at: DateTime<Utc>,
    ) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO users (email, name, role, approved, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(email)
        .bind(email.split('@').next().unwrap_or(email))
        .bind(role)
        .bind(approved)
        .bind(created_at)
        .fetch_one(self.pool())
        .await
        .expect("insert user")
    }

    pub async fn session(&self, user_id: i64, token: &str) {
        self.session_expiring(user_id, token, Utc::now() + Duration::days(1))
            .await;
    }

    pub async fn session_expiring(&self, user_id: i64, token: &str, expires_at: DateTime<Utc>) {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool())
            .await
            .expect("insert session");
    }

    /// Admin user with session token `admin-token`.
    pub async fn admin(&self) -> &'static str {
        let id = self.user("admin@campus.test", "ADMIN", true).await;
        self.session(id, "admin-token").await;
        "admin-token"
    }

    /// Faculty user + profile with the given session token; returns the faculty id.
    pub async fn faculty(&self, email: &str, approved: bool, token: &str) -> i64 {
        let user_id = self.user(email, "FACULTY", approved).await;
        self.session(user_id, token).await;
        sqlx::query_scalar(
            "INSERT INTO faculty (user_id, name, email, token_id) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(email)
        .bind(email)
        .bind(format!("token-{user_id}"))
        .fetch_one(self.pool())
        .await
        .expect("insert faculty")
    }

    pub async fn webauthn_credential(&self, faculty_id: i64, credential_id: &str) {
        sqlx::query(
            "INSERT INTO webauthn_credentials (faculty_id, credential_id, public_key) VALUES (?, ?, ?)",
        )
        .bind(faculty_id)
        .bind(credential_id)
        .bind("pk")
        .execute(self.pool())
        .await
        .expect("insert webauthn credential");
    }

    pub async fn department(&self, name: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO departments (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(self.pool())
            .await
            .expect("insert department")
    }

    pub async fn course(&self, name: &str, department_id: i64) -> i64 {
        sqlx::query_scalar("INSERT INTO courses (name, department_id) VALUES (?, ?) RETURNING id")
            .bind(name)
            .bind(department_id)
            .fetch_one(self.pool())
            .await
            .expect("insert course")
    }

    pub async fn subject(&self, name: &str, code: &str, course_id: i64, semester: i64) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO subjects (name, code, course_id, semester) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(code)
        .bind(course_id)
        .bind(semester)
        .fetch_one(self.pool())
        .await
        .expect("insert subject")
    }

    pub async fn student(&self, name: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO students (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(self.pool())
            .await
            .expect("insert student")
    }

    pub async fn attendance(&self, student_id: i64, subject_id: i64, date: NaiveDate) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO attendance (student_id, subject_id, date, status) VALUES (?, ?, ?, 'PRESENT') RETURNING id",
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(date)
        .fetch_one(self.pool())
        .await
        .expect("insert attendance")
    }

    pub async fn result(
        &self,
        student_id: i64,
        subject_id: i64,
        marks: f64,
        created_at: DateTime<Utc>,
    ) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO results (student_id, subject_id, marks, grade, created_at) VALUES (?, ?, ?, NULL, ?) RETURNING id",
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(marks)
        .bind(created_at)
        .fetch_one(self.pool())
        .await
        .expect("insert result")
    }

    pub async fn datesheet(&self, department_id: i64, course_id: i64, title: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO datesheets (department_id, course_id, semester, title, created_at) VALUES (?, ?, 1, ?, ?) RETURNING id",
        )
        .bind(department_id)
        .bind(course_id)
        .bind(title)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .expect("insert datesheet")
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
}
