use crate::error::{AppError, Result};
use axum::http::Method;

/// Liveness probe, no authentication. Other methods get the same JSON 405
/// as the summary endpoint.
pub async fn health_check(method: Method) -> Result<&'static str> {
    if method != Method::GET {
        return Err(AppError::Method(method.to_string()));
    }
    Ok("OK")
}
