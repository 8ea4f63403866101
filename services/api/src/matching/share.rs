//! Share requests: one rider invites a matched rider, who accepts or declines
//!
//! An accepted request is promoted to `mutual` right away and stamped with
//! the time both sides agreed.

use chrono::{DateTime, Utc};
use rides::{CandidateMatch, CandidateMatchStatus, ShareRequest, ShareRequestStatus};
use tracing::{info, warn};
use uuid::Uuid;

use super::MatchError;
use crate::repositories::{CandidateMatchStore, RideRequestStore, ShareRequestStore};

/// Invite the owner of `matched_request_id` to share the caller's ride `request_id`
pub async fn send_share_request<R, C, S>(
    requests: &R,
    candidates: &C,
    shares: &S,
    caller: Uuid,
    request_id: Uuid,
    matched_request_id: Uuid,
) -> Result<ShareRequest, MatchError>
where
    R: RideRequestStore,
    C: CandidateMatchStore,
    S: ShareRequestStore,
{
    let own = requests
        .get_by_id(request_id)
        .await?
        .ok_or(MatchError::RequestNotFound(request_id))?;

    if own.user_id != caller {
        return Err(MatchError::PermissionDenied);
    }

    if !own.is_active() {
        return Err(MatchError::InvalidShare(format!(
            "Ride request {} is no longer active",
            request_id
        )));
    }

    let matched = requests
        .get_by_id(matched_request_id)
        .await?
        .ok_or(MatchError::RequestNotFound(matched_request_id))?;

    if matched.user_id == caller {
        return Err(MatchError::InvalidShare(
            "Cannot send a share request to yourself".to_string(),
        ));
    }

    if shares.find_pending(caller, matched.user_id).await?.is_some() {
        return Err(MatchError::DuplicateShareRequest);
    }

    let share = ShareRequest::new(&own, &matched, Utc::now());
    if !shares.create_pending(&share).await? {
        return Err(MatchError::DuplicateShareRequest);
    }

    info!(
        "Share request {} sent from {} to {}",
        share.id, share.sender_id, share.recipient_id
    );

    // Reflect the invitation on the candidate match the caller was shown
    let candidate_id = CandidateMatch::deterministic_id(&own, &matched);
    if let Err(e) = mark_candidate_sent(candidates, candidate_id).await {
        warn!(
            "Could not mark candidate match {} as sent: {}",
            candidate_id, e
        );
    }

    Ok(share)
}

async fn mark_candidate_sent<C: CandidateMatchStore>(
    candidates: &C,
    candidate_id: Uuid,
) -> anyhow::Result<()> {
    if let Some(candidate) = candidates.get_by_id(candidate_id).await? {
        if candidate.status != CandidateMatchStatus::Sent
            && candidate.status.can_advance_to(CandidateMatchStatus::Sent)
        {
            candidates
                .set_status(candidate_id, CandidateMatchStatus::Sent)
                .await?;
        }
    }
    Ok(())
}

/// Accept or decline a share request addressed to the caller
pub async fn respond_to_share_request<S: ShareRequestStore>(
    shares: &S,
    caller: Uuid,
    share_id: Uuid,
    accept: bool,
) -> Result<ShareRequest, MatchError> {
    let mut share = shares
        .get_by_id(share_id)
        .await?
        .filter(|s| s.involves(caller))
        .ok_or(MatchError::ShareRequestNotFound(share_id))?;

    if !share.is_incoming_for(caller) {
        return Err(MatchError::PermissionDenied);
    }

    if share.status != ShareRequestStatus::Pending {
        return Err(MatchError::ShareAlreadyResolved(share_id));
    }

    let next = if accept {
        ShareRequestStatus::Accepted
    } else {
        ShareRequestStatus::Declined
    };

    let now = Utc::now();
    if !shares.respond(share_id, next, now).await? {
        return Err(MatchError::ShareAlreadyResolved(share_id));
    }
    share.status = next;
    share.responded_at = Some(now);

    info!("Share request {} {}", share_id, next.as_str());

    if accept {
        promote_accepted(shares, &mut share, now).await?;
    }

    Ok(share)
}

/// Turn an accepted request into a mutual match; no-op for any other status
pub async fn promote_accepted<S: ShareRequestStore>(
    shares: &S,
    share: &mut ShareRequest,
    at: DateTime<Utc>,
) -> Result<bool, MatchError> {
    if !share.status.can_transition_to(ShareRequestStatus::Mutual) {
        return Ok(false);
    }

    let promoted = shares.promote_to_mutual(share.id, at).await?;
    if promoted {
        share.status = ShareRequestStatus::Mutual;
        share.mutual_match_at = Some(at);
        info!(
            "Mutual match between {} and {}",
            share.sender_id, share.recipient_id
        );
    }

    Ok(promoted)
}

/// Share requests the caller sent or received, newest first
pub async fn list_share_requests<S: ShareRequestStore>(
    shares: &S,
    caller: Uuid,
    status: Option<ShareRequestStatus>,
) -> Result<Vec<ShareRequest>, MatchError> {
    Ok(shares.list_for_user(caller, status).await?)
}
