//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        BookingRequest, BookingResponse, ErrorResponse, GenerateRequest, HealthResponse,
        SubmitRequest, SubmitResponse,
    },
};
use crate::generator::generate_with_fallback;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quizfunnel_core::{QuizError, ResponseStore, StatsReport};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in Unix seconds (0 if the clock is before the epoch).
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 400 for bad input, 500 for everything else.
fn status_for(error: &QuizError) -> StatusCode {
    if error.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SUBMIT HANDLER
// =============================================================================

/// Classify and store a completed quiz.
pub async fn submit_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    let response = match request.to_new_response(unix_now()) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected quiz submission");
            return (
                status_for(&e),
                Json(SubmitResponse::error("Invalid submission", e.to_string())),
            );
        }
    };

    let mut storage = state.storage.write().await;
    match storage.insert_response(response) {
        Ok(stored) => {
            tracing::info!(id = stored.id, result = %stored.result, "Quiz response stored");
            (
                StatusCode::OK,
                Json(SubmitResponse::success(stored.id, stored.result)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store quiz response");
            (
                status_for(&e),
                Json(SubmitResponse::error("Failed to save answers", e.to_string())),
            )
        }
    }
}

// =============================================================================
// GENERATE HANDLER
// =============================================================================

/// Produce a personalized result.
///
/// Oversized input is rejected with 400 before the generator is called.
/// Past that point the response is always 200; failures degrade to fallback.
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        tracing::debug!(error = %e, "Rejected result request");
        return (
            status_for(&e),
            Json(ErrorResponse::new("Invalid request", e.to_string())),
        )
            .into_response();
    }

    let response =
        generate_with_fallback(state.generator.as_deref(), &state.renderer, &request).await;
    tracing::info!(stage = %response.stage, source = ?response.source, "Result generated");
    (StatusCode::OK, Json(response)).into_response()
}

// =============================================================================
// BOOKING HANDLER
// =============================================================================

/// Store a consultation booking.
pub async fn booking_handler(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> impl IntoResponse {
    let booking = match request.to_new_booking(unix_now()) {
        Ok(b) => b,
        Err(e) => {
            return (
                status_for(&e),
                Json(BookingResponse::error("Invalid booking", e.to_string())),
            );
        }
    };

    let mut storage = state.storage.write().await;
    match storage.insert_booking(booking) {
        Ok(stored) => {
            tracing::info!(id = stored.id, source = %stored.source, "Booking stored");
            (StatusCode::OK, Json(BookingResponse::success(stored)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store booking");
            (
                status_for(&e),
                Json(BookingResponse::error("Failed to save booking", e.to_string())),
            )
        }
    }
}

// =============================================================================
// STATS HANDLER
// =============================================================================

/// Aggregate statistics over all stored responses.
pub async fn stats_handler(State(state): State<AppState>) -> Response {
    let storage = state.storage.read().await;
    match storage.list_responses() {
        Ok(responses) => (
            StatusCode::OK,
            Json(StatsReport::from_responses(&responses)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load responses for stats");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to get stats", e.to_string())),
            )
                .into_response()
        }
    }
}
