//! Share request repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use rides::{ShareRequest, ShareRequestStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::ShareRequestStore;

const SHARE_REQUEST_COLUMNS: &str = r#"
    id, sender_id, recipient_id, sender_ride_request_id, recipient_ride_request_id,
    status, created_at, responded_at, mutual_match_at
"#;

/// Share request repository backed by the `matches` table
#[derive(Clone)]
pub struct ShareRequestRepository {
    pool: PgPool,
}

impl ShareRequestRepository {
    /// Create a new share request repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<ShareRequest> {
    let id: Uuid = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let status: ShareRequestStatus = status
        .parse()
        .map_err(|e| anyhow::anyhow!("Share request {} has invalid status: {}", id, e))?;

    Ok(ShareRequest {
        id,
        sender_id: row.try_get("sender_id")?,
        recipient_id: row.try_get("recipient_id")?,
        sender_ride_request_id: row.try_get("sender_ride_request_id")?,
        recipient_ride_request_id: row.try_get("recipient_ride_request_id")?,
        status,
        created_at: row.try_get("created_at")?,
        responded_at: row.try_get("responded_at")?,
        mutual_match_at: row.try_get("mutual_match_at")?,
    })
}

impl ShareRequestStore for ShareRequestRepository {
    async fn create_pending(&self, share: &ShareRequest) -> Result<bool> {
        // The partial unique index on pending pairs turns a racing duplicate into a no-op
        let result = sqlx::query(
            r#"
            INSERT INTO matches (id, sender_id, recipient_id, sender_ride_request_id,
                                 recipient_ride_request_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(share.id)
        .bind(share.sender_id)
        .bind(share.recipient_id)
        .bind(share.sender_ride_request_id)
        .bind(share.recipient_ride_request_id)
        .bind(ShareRequestStatus::Pending.as_str())
        .bind(share.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_pending(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<ShareRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE sender_id = $1 AND recipient_id = $2 AND status = $3",
            SHARE_REQUEST_COLUMNS
        ))
        .bind(sender_id)
        .bind(recipient_id)
        .bind(ShareRequestStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ShareRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE id = $1",
            SHARE_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ShareRequestStatus>,
    ) -> Result<Vec<ShareRequest>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM matches
            WHERE (sender_id = $1 OR recipient_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            SHARE_REQUEST_COLUMNS
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    async fn respond(
        &self,
        id: Uuid,
        status: ShareRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET status = $1, responded_at = $2
            WHERE id = $3 AND status = $4
            "#,
        )
        .bind(status.as_str())
        .bind(responded_at)
        .bind(id)
        .bind(ShareRequestStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn promote_to_mutual(&self, id: Uuid, mutual_match_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET status = $1, mutual_match_at = $2
            WHERE id = $3 AND status = $4
            "#,
        )
        .bind(ShareRequestStatus::Mutual.as_str())
        .bind(mutual_match_at)
        .bind(id)
        .bind(ShareRequestStatus::Accepted.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
