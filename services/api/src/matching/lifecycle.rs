//! Owner-driven state changes for ride requests and candidate matches

use rides::{CandidateMatch, CandidateMatchStatus, RequestStatus};
use tracing::info;
use uuid::Uuid;

use super::MatchError;
use crate::repositories::{CandidateMatchStore, RideRequestStore};

/// Withdraw a ride request so it no longer takes part in matching
pub async fn deactivate_request<R: RideRequestStore>(
    store: &R,
    caller: Uuid,
    request_id: Uuid,
) -> Result<(), MatchError> {
    let request = store
        .get_by_id(request_id)
        .await?
        .ok_or(MatchError::RequestNotFound(request_id))?;

    if request.user_id != caller {
        return Err(MatchError::PermissionDenied);
    }

    if request.is_active() {
        store.set_status(request_id, RequestStatus::Inactive).await?;
        info!("Ride request {} deactivated by owner", request_id);
    }

    Ok(())
}

/// Move a candidate match forward (`new` -> `viewed` -> `sent`).
///
/// Records owned by someone else are reported as missing.
pub async fn advance_candidate_status<C: CandidateMatchStore>(
    store: &C,
    caller: Uuid,
    candidate_id: Uuid,
    next: CandidateMatchStatus,
) -> Result<CandidateMatch, MatchError> {
    let mut candidate = store
        .get_by_id(candidate_id)
        .await?
        .filter(|c| c.user_id == caller)
        .ok_or(MatchError::CandidateNotFound(candidate_id))?;

    if !candidate.status.can_advance_to(next) {
        return Err(MatchError::InvalidTransition {
            from: candidate.status,
            to: next,
        });
    }

    if candidate.status != next {
        store.set_status(candidate_id, next).await?;
        candidate.status = next;
    }

    Ok(candidate)
}
