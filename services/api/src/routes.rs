//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    matching::{MatchQueryOutcome, lifecycle, share},
    middleware::{AuthUser, auth_middleware},
    models::{
        CandidateMatchListResponse, CandidateMatchQuery, FareSplitRequest, FindMatchesRequest,
        FindMatchesResponse, NewRideRequest, SendShareRequest, ShareRequestQuery,
        ShareRequestView, UpdateCandidateStatusRequest,
    },
    repositories::{CandidateMatchStore, HealthCheck, RideRequestStore},
    state::{AppState, Backend},
};

/// Create the router for the API service
pub fn create_router<B: Backend>(state: AppState<B>) -> Router {
    let protected_routes = Router::new()
        .route(
            "/ride-requests",
            post(create_ride_request::<B>).get(list_ride_requests::<B>),
        )
        .route(
            "/ride-requests/:id/deactivate",
            post(deactivate_ride_request::<B>),
        )
        .route("/matches/find", post(find_matches::<B>))
        .route("/candidate-matches", get(list_candidate_matches::<B>))
        .route(
            "/candidate-matches/:id/status",
            post(update_candidate_status::<B>),
        )
        .route(
            "/share-requests",
            post(send_share_request::<B>).get(list_share_requests::<B>),
        )
        .route(
            "/share-requests/:id/accept",
            post(accept_share_request::<B>),
        )
        .route(
            "/share-requests/:id/decline",
            post(decline_share_request::<B>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<B>,
        ));

    Router::new()
        .route("/health", get(health_check::<B>))
        .route("/fare-split", post(fare_split))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check<B: Backend>(State(state): State<AppState<B>>) -> impl IntoResponse {
    let database = if state.health.is_healthy().await {
        "ok"
    } else {
        "unavailable"
    };

    Json(json!({
        "status": "ok",
        "service": "rideshare-api",
        "database": database
    }))
}

/// Create a ride request for the caller and start background matching
pub async fn create_ride_request<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewRideRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate().map_err(ApiError::InvalidArgument)?;

    let request = state
        .ride_requests
        .create(user.id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create ride request: {}", e);
            ApiError::Internal
        })?;

    info!("Ride request {} created by {}", request.id, user.id);

    let ingest = state.match_ingest.clone();
    let created = request.clone();
    tokio::spawn(async move {
        ingest.on_ride_request_created(created).await;
    });

    Ok((StatusCode::CREATED, Json(request)))
}

/// List the caller's ride requests, newest first
pub async fn list_ride_requests<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let requests = state
        .ride_requests
        .list_by_user(user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list ride requests: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(requests))
}

/// Withdraw one of the caller's ride requests
pub async fn deactivate_ride_request<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    lifecycle::deactivate_request(&state.ride_requests, user.id, id).await?;

    Ok(Json(json!({ "success": true })))
}

/// Find matches for one of the caller's ride requests
pub async fn find_matches<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<FindMatchesRequest>,
) -> ApiResult<impl IntoResponse> {
    let request_id = payload
        .request_id
        .ok_or_else(|| ApiError::InvalidArgument("requestId is required".to_string()))?;

    let response = match state.match_query.find_matches(user.id, request_id).await? {
        MatchQueryOutcome::Matches(matches) => FindMatchesResponse {
            success: true,
            matches: Some(matches),
            expired: false,
        },
        MatchQueryOutcome::Expired => FindMatchesResponse {
            success: false,
            matches: None,
            expired: true,
        },
    };

    Ok(Json(response))
}

/// List the caller's candidate matches
pub async fn list_candidate_matches<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CandidateMatchQuery>,
) -> ApiResult<impl IntoResponse> {
    let items = state
        .candidate_matches
        .list_for_user(user.id, query.status)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list candidate matches: {}", e);
            ApiError::Internal
        })?;

    let total = items.len();
    Ok(Json(CandidateMatchListResponse { items, total }))
}

/// Move one of the caller's candidate matches forward
pub async fn update_candidate_status<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCandidateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let candidate =
        lifecycle::advance_candidate_status(&state.candidate_matches, user.id, id, payload.status)
            .await?;

    Ok(Json(candidate))
}

/// Invite the rider behind a match to share the caller's ride
pub async fn send_share_request<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SendShareRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(request_id), Some(matched_id)) =
        (payload.ride_request_id, payload.matched_ride_request_id)
    else {
        return Err(ApiError::InvalidArgument(
            "rideRequestId and matchedRideRequestId are required".to_string(),
        ));
    };

    let sent = share::send_share_request(
        &state.ride_requests,
        &state.candidate_matches,
        &state.share_requests,
        user.id,
        request_id,
        matched_id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShareRequestView::for_user(sent, user.id)),
    ))
}

/// Share requests the caller sent or received
pub async fn list_share_requests<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ShareRequestQuery>,
) -> ApiResult<impl IntoResponse> {
    let items: Vec<ShareRequestView> =
        share::list_share_requests(&state.share_requests, user.id, query.status)
            .await?
            .into_iter()
            .map(|request| ShareRequestView::for_user(request, user.id))
            .collect();

    Ok(Json(items))
}

/// Accept an incoming share request
pub async fn accept_share_request<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let accepted =
        share::respond_to_share_request(&state.share_requests, user.id, id, true).await?;

    Ok(Json(ShareRequestView::for_user(accepted, user.id)))
}

/// Decline an incoming share request
pub async fn decline_share_request<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let declined =
        share::respond_to_share_request(&state.share_requests, user.id, id, false).await?;

    Ok(Json(ShareRequestView::for_user(declined, user.id)))
}

/// Split a fare evenly between riders
pub async fn fare_split(Json(payload): Json<FareSplitRequest>) -> ApiResult<impl IntoResponse> {
    let split = rides::split_fare(payload.total_fare, payload.riders)?;

    Ok(Json(split))
}
