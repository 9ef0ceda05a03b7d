use crate::aggregate::Aggregator;
use crate::error::{AppError, Result};
use crate::models::MetricRecord;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, StatusCode},
    response::Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const API_KEY_PARAM: &str = "api-key";

#[derive(Clone)]
pub struct AppState {
    pub api_key: String,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(api_key: impl Into<String>, aggregator: Aggregator) -> Self {
        Self {
            api_key: api_key.into(),
            aggregator,
        }
    }
}

/// Check the caller-supplied key against the configured secret
fn authorize(expected: &str, supplied: Option<&str>) -> Result<()> {
    match supplied {
        Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(AppError::Auth),
    }
}

/// Compares every byte regardless of where the first mismatch is.
/// Only the length is allowed to short-circuit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Energy summary: `GET /?api-key=<key>`.
/// Authentication is checked before the method so that no request without a
/// valid key learns anything about the endpoint.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    method: Method,
    query: std::result::Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<(StatusCode, Json<MetricRecord>)> {
    let params = query.map(|Query(params)| params).unwrap_or_default();

    authorize(&state.api_key, params.get(API_KEY_PARAM).map(String::as_str))
        .inspect_err(|_| debug!("Rejected request: invalid api-key"))?;

    if method != Method::GET {
        debug!("Rejected request: method {}", method);
        return Err(AppError::Method(method.to_string()));
    }

    let result = state.aggregator.summarize().await?;
    Ok((result.status, Json(result.totals)))
}
