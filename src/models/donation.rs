use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Donation lifecycle: `available → accepted → completed`, with a
/// terminal delete allowed only while `available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Available,
    Accepted,
    Completed,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Available => "available",
            DonationStatus::Accepted => "accepted",
            DonationStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(DonationStatus::Available),
            "accepted" => Some(DonationStatus::Accepted),
            "completed" => Some(DonationStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub food_type: String,
    pub quantity: String,
    /// Free-text expiry indicator, e.g. "today 6pm" or "2 days".
    pub expiry_time: String,
    pub pickup_address: String,
    pub description: Option<String>,
    pub status: String,
    pub accepted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the store layer.
#[derive(Debug)]
pub struct NewDonation {
    pub food_type: String,
    pub quantity: String,
    pub expiry_time: String,
    pub pickup_address: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in [
            DonationStatus::Available,
            DonationStatus::Accepted,
            DonationStatus::Completed,
        ] {
            assert_eq!(DonationStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn status_rejects_legacy_vocabulary() {
        // 'claimed' from the second source edition merged into 'accepted'.
        assert_eq!(DonationStatus::parse("claimed"), None);
        assert_eq!(DonationStatus::parse("deleted"), None);
    }
}
