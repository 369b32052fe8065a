use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. Donors post surplus food; recipients claim it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Recipient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Recipient => "recipient",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donor" => Some(Role::Donor),
            "recipient" => Some(Role::Recipient),
            _ => None,
        }
    }
}

/// Full account row. The password hash never leaves the store layer —
/// API responses use [`AccountProfile`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub organization_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Public-facing name: organization name when present, personal
    /// name otherwise.
    pub fn display_name(&self) -> String {
        self.organization_name
            .clone()
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Account view safe to serialize in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub organization_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountProfile {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            role: a.role,
            phone: a.phone,
            address: a.address,
            organization_name: a.organization_name,
            created_at: a.created_at,
        }
    }
}

/// Insert payload for the store layer.
#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: String,
    pub address: String,
    pub organization_name: Option<String>,
}

/// Partial profile update. Email and role are immutable after
/// registration.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub organization_name: Option<String>,
}
