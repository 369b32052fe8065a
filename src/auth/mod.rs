//! Bearer-token authentication for user-scoped routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::errors::AppError;
use crate::AppState;

pub mod password;
pub mod token;

/// Authenticated account id, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// Middleware: resolves `Authorization: Bearer <token>` to exactly one
/// account id. 401 on missing, malformed, expired, or tampered tokens.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AppError::Unauthenticated)?;

    let account_id = token::verify(bearer, &state.config.session_secret)?;
    req.extensions_mut().insert(AuthUser(account_id));
    Ok(next.run(req).await)
}
