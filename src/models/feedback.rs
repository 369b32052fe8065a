use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only rating record, independent of the donation/request
/// lifecycles. Submitter identity is denormalized at submit time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub rating: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
