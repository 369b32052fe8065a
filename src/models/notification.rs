use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    DonationAccepted,
    RequestFulfilled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::DonationAccepted => "donation_accepted",
            NotificationKind::RequestFulfilled => "request_fulfilled",
        }
    }
}

/// Denormalized copy of the counterparty's contact fields, frozen at
/// the moment of the lifecycle transition. Later profile edits do not
/// touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
}

impl ContactSnapshot {
    pub fn new(name: String, account: &Account) -> Self {
        Self {
            name,
            phone: account.phone.clone(),
            address: account.address.clone(),
            email: account.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub r#type: String, // 'type' is a reserved keyword
    pub message: String,
    pub contact: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_match_wire_vocabulary() {
        assert_eq!(NotificationKind::DonationAccepted.as_str(), "donation_accepted");
        assert_eq!(NotificationKind::RequestFulfilled.as_str(), "request_fulfilled");
    }

    #[test]
    fn contact_snapshot_serializes_all_fields() {
        let snapshot = ContactSnapshot {
            name: "Sunrise Home".into(),
            phone: "555-0100".into(),
            address: "12 Hill Road".into(),
            email: "home@example.org".into(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["name"], "Sunrise Home");
        assert_eq!(json["phone"], "555-0100");
        assert_eq!(json["address"], "12 Hill Road");
        assert_eq!(json["email"], "home@example.org");
    }
}
