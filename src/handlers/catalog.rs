use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use tracing::info;

use crate::db::Store;
use crate::error::{GatewayError, OperationExt};
use crate::router::GatewayState;
use crate::types::views::{CreatedSignupView, SubjectView};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectsQuery {
    pub course_ids: Option<String>,
}

/// Parse a comma-separated id list. Empty or non-numeric tokens are dropped,
/// duplicates collapse, and the result is sorted.
pub fn parse_course_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|tok| tok.trim().parse::<i64>().ok())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// GET /subjects?courseIds=1,2,3
pub async fn subjects_by_courses<S: Store>(
    State(state): State<GatewayState<S>>,
    Query(query): Query<SubjectsQuery>,
) -> Result<Json<Vec<SubjectView>>, GatewayError> {
    let course_ids = query
        .course_ids
        .as_deref()
        .map(parse_course_ids)
        .unwrap_or_default();
    if course_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let rows = state
        .store
        .subjects_by_courses(&course_ids)
        .await
        .during("Fetch subjects")?;
    Ok(Json(rows.into_iter().map(SubjectView::from).collect()))
}

/// POST /publicsignup -> stores the submitted form object.
pub async fn create_public_signup<S: Store>(
    State(state): State<GatewayState<S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedSignupView>), GatewayError> {
    let Json(payload) = body.map_err(|e| GatewayError::Validation(e.body_text()))?;
    if !payload.is_object() {
        return Err(GatewayError::Validation(
            "Signup payload must be a JSON object".to_string(),
        ));
    }

    let row = state
        .store
        .create_public_signup(&payload)
        .await
        .during("Create public signup")?;
    info!(signup_id = row.id, "public signup stored");
    Ok((
        StatusCode::CREATED,
        Json(CreatedSignupView {
            id: row.id,
            created_at: row.created_at,
        }),
    ))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_ids_drop_junk_and_duplicates() {
        assert_eq!(parse_course_ids("3, 1,abc,,3,2"), vec![1, 2, 3]);
        assert!(parse_course_ids("").is_empty());
        assert!(parse_course_ids(",, x").is_empty());
    }
}
