use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::errors::AppError;
use crate::models::account::{Account, AccountProfile, NewAccount, ProfileUpdate, Role};
use crate::models::donation::{Donation, NewDonation};
use crate::models::feedback::Feedback;
use crate::models::notification::{ContactSnapshot, Notification, NotificationKind};
use crate::models::request::{FoodRequest, NewRequest, Urgency};
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub organization_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub account: AccountProfile,
}

#[derive(Deserialize)]
pub struct CreateDonationRequest {
    pub food_type: String,
    pub quantity: String,
    pub expiry_time: String,
    pub pickup_address: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateFoodRequest {
    pub food_type: String,
    pub quantity: String,
    pub urgency: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmitFeedbackRequest {
    pub rating: i32,
    pub message: String,
}

#[derive(Deserialize)]
pub struct FeedbackListParams {
    pub limit: Option<i64>,
}

// ── Validation helpers ───────────────────────────────────────

fn require_fields(fields: &[(&str, &str)]) -> Result<(), AppError> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", name)));
        }
    }
    Ok(())
}

fn donation_accepted_message(food_type: &str) -> String {
    format!("Your donation of {} has been accepted!", food_type)
}

fn request_fulfilled_message(food_type: &str) -> String {
    format!("Your request for {} has been fulfilled!", food_type)
}

async fn load_account(state: &AppState, id: Uuid) -> Result<Account, AppError> {
    state
        .db
        .get_account(id)
        .await?
        .ok_or(AppError::NotFound("account"))
}

// ── Auth handlers ────────────────────────────────────────────

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    require_fields(&[
        ("name", &payload.name),
        ("email", &payload.email),
        ("password", &payload.password),
        ("phone", &payload.phone),
        ("address", &payload.address),
    ])?;
    let role = Role::parse(&payload.role)
        .ok_or_else(|| AppError::Validation("role must be 'donor' or 'recipient'".into()))?;

    let password_hash = auth::password::hash(&payload.password)?;
    let account = state
        .db
        .insert_account(&NewAccount {
            name: payload.name,
            email: payload.email,
            password_hash,
            role,
            phone: payload.phone,
            address: payload.address,
            organization_name: payload.organization_name,
        })
        .await?;

    let token = auth::token::issue(
        account.id,
        &state.config.session_secret,
        state.config.session_ttl_hours,
    )?;
    tracing::info!(account_id = %account.id, role = %account.role, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            account: account.into(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let account = state
        .db
        .find_account_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !auth::password::verify(&payload.password, &account.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = auth::token::issue(
        account.id,
        &state.config.session_secret,
        state.config.session_ttl_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        account: account.into(),
    }))
}

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AccountProfile>, AppError> {
    let account = load_account(&state, user.0).await?;
    Ok(Json(account.into()))
}

/// PUT /api/auth/profile — partial update; email and role are immutable.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<AccountProfile>, AppError> {
    for (name, value) in [
        ("name", &payload.name),
        ("phone", &payload.phone),
        ("address", &payload.address),
    ] {
        if let Some(v) = value {
            require_fields(&[(name, v.as_str())])?;
        }
    }
    let account = state.db.update_profile(user.0, &payload).await?;
    Ok(Json(account.into()))
}

// ── Donation handlers ────────────────────────────────────────

/// POST /api/donations
pub async fn create_donation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<Donation>), AppError> {
    require_fields(&[
        ("food_type", &payload.food_type),
        ("quantity", &payload.quantity),
        ("expiry_time", &payload.expiry_time),
        ("pickup_address", &payload.pickup_address),
    ])?;

    let donation = state
        .db
        .insert_donation(
            user.0,
            &NewDonation {
                food_type: payload.food_type,
                quantity: payload.quantity,
                expiry_time: payload.expiry_time,
                pickup_address: payload.pickup_address,
                description: payload.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

/// GET /api/donations — all donations still open for claiming
pub async fn list_available_donations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Donation>>, AppError> {
    Ok(Json(state.db.list_available_donations().await?))
}

/// GET /api/donations/mine
pub async fn list_my_donations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Donation>>, AppError> {
    Ok(Json(state.db.list_donations_by_donor(user.0).await?))
}

/// GET /api/donations/claimed — donations the caller has accepted
pub async fn list_claimed_donations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Donation>>, AppError> {
    Ok(Json(state.db.list_donations_by_claimant(user.0).await?))
}

/// PUT /api/donations/:id/accept — claim an available donation.
///
/// The store performs the atomic check-and-set; on success the donor is
/// notified with the claimant's contact details as they stand right now.
pub async fn accept_donation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Donation>, AppError> {
    let donation = state.db.accept_donation(id, user.0).await?;

    let claimant = load_account(&state, user.0).await?;
    let contact = ContactSnapshot::new(claimant.display_name(), &claimant);
    state
        .db
        .insert_notification(
            donation.donor_id,
            NotificationKind::DonationAccepted,
            &donation_accepted_message(&donation.food_type),
            serde_json::to_value(&contact).map_err(anyhow::Error::from)?,
        )
        .await?;
    tracing::info!(donation_id = %donation.id, claimant = %user.0, "donation accepted");

    Ok(Json(donation))
}

/// PUT /api/donations/:id/complete — owner-only; accepted donations only.
pub async fn complete_donation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Donation>, AppError> {
    let donation = state.db.complete_donation(id, user.0).await?;
    Ok(Json(donation))
}

/// DELETE /api/donations/:id — owner-only; available donations only.
pub async fn delete_donation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.db.delete_donation(id, user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Request handlers ─────────────────────────────────────────

/// POST /api/requests
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateFoodRequest>,
) -> Result<(StatusCode, Json<FoodRequest>), AppError> {
    require_fields(&[
        ("food_type", &payload.food_type),
        ("quantity", &payload.quantity),
    ])?;
    let urgency = Urgency::parse(&payload.urgency)
        .ok_or_else(|| AppError::Validation("urgency must be 'low', 'medium' or 'high'".into()))?;

    let request = state
        .db
        .insert_request(
            user.0,
            &NewRequest {
                food_type: payload.food_type,
                quantity: payload.quantity,
                urgency,
                description: payload.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/requests — all requests still awaiting a donor
pub async fn list_pending_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FoodRequest>>, AppError> {
    Ok(Json(state.db.list_pending_requests().await?))
}

/// GET /api/requests/mine
pub async fn list_my_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<FoodRequest>>, AppError> {
    Ok(Json(state.db.list_requests_by_recipient(user.0).await?))
}

/// PUT /api/requests/:id/fulfill — mirror of accept_donation.
///
/// The requester is notified with the fulfilling donor's contact
/// details. Personal name here, not organization — the requester needs
/// to reach the individual donor.
pub async fn fulfill_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodRequest>, AppError> {
    let request = state.db.fulfill_request(id, user.0).await?;

    let fulfiller = load_account(&state, user.0).await?;
    let contact = ContactSnapshot::new(fulfiller.name.clone(), &fulfiller);
    state
        .db
        .insert_notification(
            request.recipient_id,
            NotificationKind::RequestFulfilled,
            &request_fulfilled_message(&request.food_type),
            serde_json::to_value(&contact).map_err(anyhow::Error::from)?,
        )
        .await?;
    tracing::info!(request_id = %request.id, fulfiller = %user.0, "request fulfilled");

    Ok(Json(request))
}

/// PUT /api/requests/:id/cancel — owner-only; pending requests only.
pub async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodRequest>, AppError> {
    let request = state.db.cancel_request(id, user.0).await?;
    Ok(Json(request))
}

// ── Notification handlers ────────────────────────────────────

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(state.db.list_notifications(user.0).await?))
}

/// GET /api/notifications/unread
pub async fn count_unread_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let unread = state.db.count_unread_notifications(user.0).await?;
    Ok(Json(json!({ "unread": unread })))
}

/// PUT /api/notifications/:id/read — idempotent; caller must own it.
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = state.db.mark_notification_read(id, user.0).await?;
    Ok(Json(notification))
}

// ── Feedback handlers ────────────────────────────────────────

/// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::Validation("rating must be between 1 and 5".into()));
    }
    require_fields(&[("message", &payload.message)])?;

    let account = load_account(&state, user.0).await?;
    let feedback = state
        .db
        .insert_feedback(
            user.0,
            &account.display_name(),
            &account.email,
            &account.role,
            payload.rating,
            &payload.message,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// GET /api/feedback — public, capped listing
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedbackListParams>,
) -> Result<Json<Vec<Feedback>>, AppError> {
    let cap = state.config.feedback_list_cap;
    let limit = params.limit.unwrap_or(cap).clamp(1, cap);
    Ok(Json(state.db.list_feedback(limit).await?))
}

/// GET /api/feedback/mine — unbounded, caller-scoped
pub async fn list_my_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Feedback>>, AppError> {
    Ok(Json(state.db.list_feedback_by_user(user.0).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_fields_accepts_non_empty() {
        assert!(require_fields(&[("food_type", "Rice"), ("quantity", "10kg")]).is_ok());
    }

    #[test]
    fn require_fields_rejects_empty_and_whitespace() {
        let err = require_fields(&[("food_type", "Rice"), ("quantity", "   ")]).unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "quantity is required"),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn notification_messages_name_the_food() {
        assert_eq!(
            donation_accepted_message("Rice"),
            "Your donation of Rice has been accepted!"
        );
        assert_eq!(
            request_fulfilled_message("Lentils"),
            "Your request for Lentils has been fulfilled!"
        );
    }
}
