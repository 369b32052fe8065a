//! All SQL lives here. Lifecycle transitions are single conditional
//! UPDATEs (check-and-set on the status column) so that concurrent
//! claims resolve to exactly one winner; a failed CAS is split into
//! `NotFound` vs `InvalidTransition` by a follow-up point read.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::account::{Account, NewAccount, ProfileUpdate};
use crate::models::donation::{Donation, NewDonation};
use crate::models::feedback::Feedback;
use crate::models::notification::{Notification, NotificationKind};
use crate::models::request::{FoodRequest, NewRequest};

const ACCOUNT_COLS: &str =
    "id, name, email, password_hash, role, phone, address, organization_name, created_at";
const DONATION_COLS: &str = "id, donor_id, food_type, quantity, expiry_time, pickup_address, description, status, accepted_by, created_at";
const REQUEST_COLS: &str = "id, recipient_id, food_type, quantity, urgency, description, status, fulfilled_by, created_at";
const NOTIFICATION_COLS: &str = "id, user_id, type, message, contact, is_read, created_at";
const FEEDBACK_COLS: &str = "id, user_id, name, email, role, rating, message, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Create a pool without dialing the server. Used where a live
    /// database is not required up front (router construction in tests).
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- Account Operations --

    pub async fn insert_account(&self, new: &NewAccount) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, Account>(&format!(
            r#"INSERT INTO accounts (name, email, password_hash, role, phone, address, organization_name)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {ACCOUNT_COLS}"#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(&new.phone)
        .bind(&new.address)
        .bind(&new.organization_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                AppError::DuplicateEmail
            } else {
                AppError::Database(e)
            }
        })?;
        Ok(row)
    }

    pub async fn get_account(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLS} FROM accounts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Partial update; absent fields keep their stored values. Email
    /// and role are immutable and not touched here.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, Account>(&format!(
            r#"UPDATE accounts
               SET name = COALESCE($2, name),
                   phone = COALESCE($3, phone),
                   address = COALESCE($4, address),
                   organization_name = COALESCE($5, organization_name)
               WHERE id = $1
               RETURNING {ACCOUNT_COLS}"#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.organization_name)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(AppError::NotFound("account"))
    }

    // -- Donation Operations --

    pub async fn insert_donation(
        &self,
        donor_id: Uuid,
        new: &NewDonation,
    ) -> Result<Donation, AppError> {
        let row = sqlx::query_as::<_, Donation>(&format!(
            r#"INSERT INTO donations (donor_id, food_type, quantity, expiry_time, pickup_address, description)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {DONATION_COLS}"#
        ))
        .bind(donor_id)
        .bind(&new.food_type)
        .bind(&new.quantity)
        .bind(&new.expiry_time)
        .bind(&new.pickup_address)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_donation(&self, id: Uuid) -> Result<Option<Donation>, AppError> {
        let row = sqlx::query_as::<_, Donation>(&format!(
            "SELECT {DONATION_COLS} FROM donations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_available_donations(&self) -> Result<Vec<Donation>, AppError> {
        let rows = sqlx::query_as::<_, Donation>(&format!(
            "SELECT {DONATION_COLS} FROM donations WHERE status = 'available' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_donations_by_donor(&self, donor_id: Uuid) -> Result<Vec<Donation>, AppError> {
        let rows = sqlx::query_as::<_, Donation>(&format!(
            "SELECT {DONATION_COLS} FROM donations WHERE donor_id = $1 ORDER BY created_at DESC"
        ))
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_donations_by_claimant(
        &self,
        claimant_id: Uuid,
    ) -> Result<Vec<Donation>, AppError> {
        let rows = sqlx::query_as::<_, Donation>(&format!(
            "SELECT {DONATION_COLS} FROM donations WHERE accepted_by = $1 ORDER BY created_at DESC"
        ))
        .bind(claimant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Atomic claim. Under concurrent accepts exactly one UPDATE
    /// matches; the loser's CAS affects zero rows and is reported as
    /// `InvalidTransition`.
    pub async fn accept_donation(
        &self,
        id: Uuid,
        claimant_id: Uuid,
    ) -> Result<Donation, AppError> {
        let row = sqlx::query_as::<_, Donation>(&format!(
            r#"UPDATE donations
               SET status = 'accepted', accepted_by = $2
               WHERE id = $1 AND status = 'available' AND donor_id <> $2
               RETURNING {DONATION_COLS}"#
        ))
        .bind(id)
        .bind(claimant_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(donation) => Ok(donation),
            None => match self.get_donation(id).await? {
                None => Err(AppError::NotFound("donation")),
                Some(d) if d.donor_id == claimant_id => {
                    Err(AppError::InvalidTransition("cannot accept your own donation"))
                }
                Some(_) => Err(AppError::InvalidTransition("donation is not available")),
            },
        }
    }

    /// Only the owning donor may complete, and only from `accepted`.
    pub async fn complete_donation(
        &self,
        id: Uuid,
        donor_id: Uuid,
    ) -> Result<Donation, AppError> {
        let row = sqlx::query_as::<_, Donation>(&format!(
            r#"UPDATE donations
               SET status = 'completed'
               WHERE id = $1 AND donor_id = $2 AND status = 'accepted'
               RETURNING {DONATION_COLS}"#
        ))
        .bind(id)
        .bind(donor_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(donation) => Ok(donation),
            None => match self.get_donation(id).await? {
                None => Err(AppError::NotFound("donation")),
                // Foreign donations are not acknowledged to exist.
                Some(d) if d.donor_id != donor_id => Err(AppError::NotFound("donation")),
                Some(_) => Err(AppError::InvalidTransition(
                    "only an accepted donation can be completed",
                )),
            },
        }
    }

    /// Only the owning donor may delete, and only while `available`.
    pub async fn delete_donation(&self, id: Uuid, donor_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM donations WHERE id = $1 AND donor_id = $2 AND status = 'available'",
        )
        .bind(id)
        .bind(donor_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        match self.get_donation(id).await? {
            None => Err(AppError::NotFound("donation")),
            Some(d) if d.donor_id != donor_id => Err(AppError::NotFound("donation")),
            Some(_) => Err(AppError::InvalidTransition(
                "only an available donation can be deleted",
            )),
        }
    }

    // -- Request Operations --

    pub async fn insert_request(
        &self,
        recipient_id: Uuid,
        new: &NewRequest,
    ) -> Result<FoodRequest, AppError> {
        let row = sqlx::query_as::<_, FoodRequest>(&format!(
            r#"INSERT INTO requests (recipient_id, food_type, quantity, urgency, description)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {REQUEST_COLS}"#
        ))
        .bind(recipient_id)
        .bind(&new.food_type)
        .bind(&new.quantity)
        .bind(new.urgency.as_str())
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_request(&self, id: Uuid) -> Result<Option<FoodRequest>, AppError> {
        let row = sqlx::query_as::<_, FoodRequest>(&format!(
            "SELECT {REQUEST_COLS} FROM requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_pending_requests(&self) -> Result<Vec<FoodRequest>, AppError> {
        let rows = sqlx::query_as::<_, FoodRequest>(&format!(
            "SELECT {REQUEST_COLS} FROM requests WHERE status = 'pending' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_requests_by_recipient(
        &self,
        recipient_id: Uuid,
    ) -> Result<Vec<FoodRequest>, AppError> {
        let rows = sqlx::query_as::<_, FoodRequest>(&format!(
            "SELECT {REQUEST_COLS} FROM requests WHERE recipient_id = $1 ORDER BY created_at DESC"
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Atomic fulfill, mirror of [`accept_donation`].
    pub async fn fulfill_request(
        &self,
        id: Uuid,
        fulfiller_id: Uuid,
    ) -> Result<FoodRequest, AppError> {
        let row = sqlx::query_as::<_, FoodRequest>(&format!(
            r#"UPDATE requests
               SET status = 'fulfilled', fulfilled_by = $2
               WHERE id = $1 AND status = 'pending' AND recipient_id <> $2
               RETURNING {REQUEST_COLS}"#
        ))
        .bind(id)
        .bind(fulfiller_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(request) => Ok(request),
            None => match self.get_request(id).await? {
                None => Err(AppError::NotFound("request")),
                Some(r) if r.recipient_id == fulfiller_id => {
                    Err(AppError::InvalidTransition("cannot fulfill your own request"))
                }
                Some(_) => Err(AppError::InvalidTransition("request is not pending")),
            },
        }
    }

    /// Only the owning recipient may cancel, and only while `pending`.
    pub async fn cancel_request(
        &self,
        id: Uuid,
        recipient_id: Uuid,
    ) -> Result<FoodRequest, AppError> {
        let row = sqlx::query_as::<_, FoodRequest>(&format!(
            r#"UPDATE requests
               SET status = 'cancelled'
               WHERE id = $1 AND recipient_id = $2 AND status = 'pending'
               RETURNING {REQUEST_COLS}"#
        ))
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(request) => Ok(request),
            None => match self.get_request(id).await? {
                None => Err(AppError::NotFound("request")),
                Some(r) if r.recipient_id != recipient_id => Err(AppError::NotFound("request")),
                Some(_) => Err(AppError::InvalidTransition(
                    "only a pending request can be cancelled",
                )),
            },
        }
    }

    // -- Notification Operations --

    pub async fn insert_notification(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        message: &str,
        contact: serde_json::Value,
    ) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, Notification>(&format!(
            r#"INSERT INTO notifications (user_id, type, message, contact)
               VALUES ($1, $2, $3, $4)
               RETURNING {NOTIFICATION_COLS}"#
        ))
        .bind(user_id)
        .bind(kind.as_str())
        .bind(message)
        .bind(contact)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLS} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_unread_notifications(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Idempotent flag flip, scoped to the target user. A foreign or
    /// unknown id reports `NotFound`.
    pub async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, Notification>(&format!(
            r#"UPDATE notifications
               SET is_read = true
               WHERE id = $1 AND user_id = $2
               RETURNING {NOTIFICATION_COLS}"#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(AppError::NotFound("notification"))
    }

    // -- Feedback Operations --

    pub async fn insert_feedback(
        &self,
        user_id: Uuid,
        name: &str,
        email: &str,
        role: &str,
        rating: i32,
        message: &str,
    ) -> Result<Feedback, AppError> {
        let row = sqlx::query_as::<_, Feedback>(&format!(
            r#"INSERT INTO feedback (user_id, name, email, role, rating, message)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {FEEDBACK_COLS}"#
        ))
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(rating)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_feedback(&self, limit: i64) -> Result<Vec<Feedback>, AppError> {
        let rows = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLS} FROM feedback ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_feedback_by_user(&self, user_id: Uuid) -> Result<Vec<Feedback>, AppError> {
        let rows = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLS} FROM feedback WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
