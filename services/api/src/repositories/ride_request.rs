//! Ride request repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use rides::{Coordinate, GenderPreference, RequestStatus, RideRequest};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use super::RideRequestStore;
use crate::models::NewRideRequest;

const RIDE_REQUEST_COLUMNS: &str = r#"
    id, user_id, pickup_lat, pickup_lng, drop_lat, drop_lng, pickup_text, drop_text,
    time_start, time_end, gender_preference, route_polyline, status, created_at
"#;

/// Ride request repository backed by PostgreSQL
#[derive(Clone)]
pub struct RideRequestRepository {
    pool: PgPool,
}

impl RideRequestRepository {
    /// Create a new ride request repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn coordinate(row: &PgRow, lat: &str, lng: &str) -> Result<Option<Coordinate>> {
    let latitude: Option<f64> = row.try_get(lat)?;
    let longitude: Option<f64> = row.try_get(lng)?;
    Ok(latitude.zip(longitude).map(|(la, lo)| Coordinate::new(la, lo)))
}

fn map_row(row: &PgRow) -> Result<RideRequest> {
    let id: Uuid = row.try_get("id")?;

    let gender: String = row.try_get("gender_preference")?;
    let gender_preference: GenderPreference = gender.parse().unwrap_or_else(|e| {
        warn!("Ride request {} has {}, treating as any", id, e);
        Default::default()
    });

    let status: String = row.try_get("status")?;
    let status: RequestStatus = status
        .parse()
        .map_err(|e| anyhow::anyhow!("Ride request {} has invalid status: {}", id, e))?;

    Ok(RideRequest {
        id,
        user_id: row.try_get("user_id")?,
        pickup: coordinate(row, "pickup_lat", "pickup_lng")?,
        drop: coordinate(row, "drop_lat", "drop_lng")?,
        pickup_text: row.try_get("pickup_text")?,
        drop_text: row.try_get("drop_text")?,
        time_start: row.try_get("time_start")?,
        time_end: row.try_get("time_end")?,
        gender_preference,
        route_polyline: row.try_get("route_polyline")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

impl RideRequestStore for RideRequestRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<RideRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM ride_requests WHERE id = $1",
            RIDE_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<RideRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ride_requests WHERE status = $1",
            RIDE_REQUEST_COLUMNS
        ))
        .bind(RequestStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<RideRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ride_requests WHERE user_id = $1 ORDER BY created_at DESC",
            RIDE_REQUEST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    async fn create(&self, user_id: Uuid, request: &NewRideRequest) -> Result<RideRequest> {
        info!("Creating ride request for user: {}", user_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO ride_requests (user_id, pickup_lat, pickup_lng, drop_lat, drop_lng,
                                       pickup_text, drop_text, time_start, time_end,
                                       gender_preference, route_polyline, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            RIDE_REQUEST_COLUMNS
        ))
        .bind(user_id)
        .bind(request.pickup.map(|c| c.latitude))
        .bind(request.pickup.map(|c| c.longitude))
        .bind(request.drop.map(|c| c.latitude))
        .bind(request.drop.map(|c| c.longitude))
        .bind(request.pickup_text.trim())
        .bind(request.drop_text.trim())
        .bind(&request.time_start)
        .bind(&request.time_end)
        .bind(request.gender_preference.as_str())
        .bind(request.route_polyline.as_deref().filter(|p| !p.is_empty()))
        .bind(RequestStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_row(&row)
    }

    async fn set_status(&self, id: Uuid, status: RequestStatus) -> Result<()> {
        sqlx::query("UPDATE ride_requests SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_expired(&self, id: Uuid, expired_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE ride_requests
            SET status = $1, expired_at = COALESCE(expired_at, $2)
            WHERE id = $3
            "#,
        )
        .bind(RequestStatus::Inactive.as_str())
        .bind(expired_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
