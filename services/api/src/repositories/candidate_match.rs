//! Candidate match repository for database operations

use anyhow::Result;
use rides::{CandidateMatch, CandidateMatchStatus, ProfileSnapshot};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::CandidateMatchStore;

const CANDIDATE_MATCH_COLUMNS: &str = r#"
    id, user_id, ride_request_id, matched_user_id, matched_ride_request_id,
    matched_user_name, matched_user_gender, matched_user_age, matched_user_phone,
    matched_user_photo_url, pickup_text, drop_text, time_start, time_end,
    compatibility_score, distance_km, status, created_at
"#;

/// Candidate match repository backed by PostgreSQL
#[derive(Clone)]
pub struct CandidateMatchRepository {
    pool: PgPool,
}

impl CandidateMatchRepository {
    /// Create a new candidate match repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<CandidateMatch> {
    let id: Uuid = row.try_get("id")?;
    let score: i32 = row.try_get("compatibility_score")?;
    let status: String = row.try_get("status")?;
    let status: CandidateMatchStatus = status
        .parse()
        .map_err(|e| anyhow::anyhow!("Candidate match {} has invalid status: {}", id, e))?;

    Ok(CandidateMatch {
        id,
        user_id: row.try_get("user_id")?,
        ride_request_id: row.try_get("ride_request_id")?,
        matched_user_id: row.try_get("matched_user_id")?,
        matched_ride_request_id: row.try_get("matched_ride_request_id")?,
        matched_profile: ProfileSnapshot {
            name: row.try_get("matched_user_name")?,
            gender: row.try_get("matched_user_gender")?,
            age: row.try_get("matched_user_age")?,
            phone: row.try_get("matched_user_phone")?,
            photo_url: row.try_get("matched_user_photo_url")?,
        },
        pickup_text: row.try_get("pickup_text")?,
        drop_text: row.try_get("drop_text")?,
        time_start: row.try_get("time_start")?,
        time_end: row.try_get("time_end")?,
        compatibility_score: u32::try_from(score)?,
        distance_km: row.try_get("distance_km")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

impl CandidateMatchStore for CandidateMatchRepository {
    async fn create_if_absent(&self, candidate: &CandidateMatch) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO candidate_matches (id, user_id, ride_request_id, matched_user_id,
                                           matched_ride_request_id, matched_user_name,
                                           matched_user_gender, matched_user_age,
                                           matched_user_phone, matched_user_photo_url,
                                           pickup_text, drop_text, time_start, time_end,
                                           compatibility_score, distance_km, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.user_id)
        .bind(candidate.ride_request_id)
        .bind(candidate.matched_user_id)
        .bind(candidate.matched_ride_request_id)
        .bind(&candidate.matched_profile.name)
        .bind(&candidate.matched_profile.gender)
        .bind(candidate.matched_profile.age)
        .bind(&candidate.matched_profile.phone)
        .bind(&candidate.matched_profile.photo_url)
        .bind(&candidate.pickup_text)
        .bind(&candidate.drop_text)
        .bind(&candidate.time_start)
        .bind(&candidate.time_end)
        .bind(i32::try_from(candidate.compatibility_score)?)
        .bind(candidate.distance_km)
        .bind(candidate.status.as_str())
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<CandidateMatchStatus>,
    ) -> Result<Vec<CandidateMatch>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM candidate_matches
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY compatibility_score DESC, created_at DESC
            "#,
            CANDIDATE_MATCH_COLUMNS
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<CandidateMatch>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM candidate_matches WHERE id = $1",
            CANDIDATE_MATCH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn set_status(&self, id: Uuid, status: CandidateMatchStatus) -> Result<()> {
        sqlx::query("UPDATE candidate_matches SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
