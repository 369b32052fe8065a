use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{auth, AppState};

pub mod handlers;

/// Build the API router. All routes are relative — the caller mounts
/// this under `/api`. Everything except registration, login, and the
/// public feedback listing requires a bearer token.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/feedback", get(handlers::list_feedback));

    let protected = Router::new()
        .route(
            "/auth/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/donations",
            get(handlers::list_available_donations).post(handlers::create_donation),
        )
        .route("/donations/mine", get(handlers::list_my_donations))
        .route("/donations/claimed", get(handlers::list_claimed_donations))
        .route("/donations/:id/accept", put(handlers::accept_donation))
        .route("/donations/:id/complete", put(handlers::complete_donation))
        .route("/donations/:id", delete(handlers::delete_donation))
        .route(
            "/requests",
            get(handlers::list_pending_requests).post(handlers::create_request),
        )
        .route("/requests/mine", get(handlers::list_my_requests))
        .route("/requests/:id/fulfill", put(handlers::fulfill_request))
        .route("/requests/:id/cancel", put(handlers::cancel_request))
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/notifications/unread",
            get(handlers::count_unread_notifications),
        )
        .route(
            "/notifications/:id/read",
            put(handlers::mark_notification_read),
        )
        .route("/feedback", post(handlers::submit_feedback))
        .route("/feedback/mine", get(handlers::list_my_feedback))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth));

    public.merge(protected).fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
