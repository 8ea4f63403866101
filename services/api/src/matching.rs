//! Orchestration around the compatibility scorer
//!
//! Two entry points share the same candidate filtering: the on-demand
//! query ([`query::MatchQueryService`]) and the creation-triggered fan-out
//! ([`ingest::MatchIngestService`]). Riders then act on what they were shown
//! through [`lifecycle`] and [`share`].

use chrono::{DateTime, Duration, Utc};
use rides::{CandidateMatchStatus, MatchableRide, RideRequest};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub mod ingest;
pub mod lifecycle;
pub mod query;
pub mod share;

pub use ingest::MatchIngestService;
pub use query::{MatchQueryOutcome, MatchQueryService};

/// Failures surfaced by the matching layer
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Ride request {0} not found")]
    RequestNotFound(Uuid),

    #[error("Candidate match {0} not found")]
    CandidateNotFound(Uuid),

    #[error("Not authorized")]
    PermissionDenied,

    #[error("Cannot move candidate match from {from:?} to {to:?}")]
    InvalidTransition {
        from: CandidateMatchStatus,
        to: CandidateMatchStatus,
    },

    #[error("Share request {0} not found")]
    ShareRequestNotFound(Uuid),

    #[error("A share request to this rider is already pending")]
    DuplicateShareRequest,

    #[error("Share request {0} has already been answered")]
    ShareAlreadyResolved(Uuid),

    #[error("{0}")]
    InvalidShare(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Active, unexpired, well-formed requests from other users, ready to score
pub(crate) fn eligible_candidates<'a>(
    origin: &'a RideRequest,
    pool: &'a [RideRequest],
    now: DateTime<Utc>,
    ttl: Duration,
) -> impl Iterator<Item = MatchableRide<'a>> + 'a {
    pool.iter()
        .filter(move |c| c.id != origin.id && c.user_id != origin.user_id)
        .filter(|c| c.is_active())
        .filter(move |c| !c.is_expired(now, ttl))
        .filter_map(|c| {
            let matchable = c.matchable();
            if matchable.is_none() {
                debug!("Skipping malformed ride request {}", c.id);
            }
            matchable
        })
}
