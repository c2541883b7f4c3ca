//! Staff gate for the sync endpoint.
//!
//! Requests must carry `X-Admin-Key` matching `ADMIN_API_KEY`. Without a
//! configured key, access is allowed (with a warning) outside production and
//! refused in production.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::error::AppError;
use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

pub async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = headers.get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok());

    match (state.admin_key.as_deref(), provided, state.production) {
        (Some(expected), Some(provided), _) if expected == provided => Ok(next.run(request).await),
        (Some(_), _, _) => {
            tracing::warn!(
                path = %request.uri().path(),
                key_present = provided.is_some(),
                "admin access denied"
            );
            Err(AppError::Unauthorized)
        }
        (None, _, false) => {
            tracing::warn!("ADMIN_API_KEY not configured, allowing access outside production");
            Ok(next.run(request).await)
        }
        (None, _, true) => {
            tracing::error!("ADMIN_API_KEY not configured in production, blocking admin access");
            Err(AppError::Unavailable("admin access is not configured".to_string()))
        }
    }
}
