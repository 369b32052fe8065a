use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request lifecycle: `pending → fulfilled`, with a side-exit
/// `pending → cancelled`. Mirror image of the donation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "fulfilled" => Some(RequestStatus::Fulfilled),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Urgency::Low),
            "medium" => Some(Urgency::Medium),
            "high" => Some(Urgency::High),
            _ => None,
        }
    }
}

/// A recipient's expressed need. `Request` would shadow the axum type,
/// hence `FoodRequest`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FoodRequest {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub food_type: String,
    pub quantity: String,
    pub urgency: String,
    pub description: Option<String>,
    pub status: String,
    pub fulfilled_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the store layer.
#[derive(Debug)]
pub struct NewRequest {
    pub food_type: String,
    pub quantity: String,
    pub urgency: Urgency,
    pub description: Option<String>,
}
