use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::GatewayError;

/// A positive integer row id taken from the single path parameter.
/// Anything else is rejected with 400 before the store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidId(pub i64);

pub fn parse_id(raw: &str) -> Result<i64, GatewayError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(GatewayError::Validation(format!("Invalid id: {raw}"))),
    }
}

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| GatewayError::Validation("Invalid id".to_string()))?;
        parse_id(&raw).map(ValidId)
    }
}
