use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::RosterSettings;
use crate::core::{derive_preferences, MatchingEngine, MatchingError, SimilarityParams};
use crate::models::{
    ErrorResponse, HealthResponse, Matching, Participant, PreferencesResponse, RankedList, RosterResponse,
    SolveRequest, SolveResponse,
};
use crate::services::{deliver_all, load_roster, NotificationComposer, NotificationSink};

/// Application state shared across all handlers
///
/// Holds configuration only; every request builds and drops its own table.
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchingEngine,
    pub similarity: SimilarityParams,
    pub roster: RosterSettings,
    pub composer: NotificationComposer,
    pub notifications_enabled: bool,
    pub sink: Arc<dyn NotificationSink>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/solve", web::post().to(solve))
        .route("/matches/preferences", web::post().to(preferences))
        .route("/matches/roster", web::post().to(solve_roster));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Solve endpoint
///
/// POST /api/v1/matches/solve
///
/// Request body:
/// ```json
/// {
///   "participants": [{ "key": "string", "name": "string", "attributes": { ... } }],
///   "invertAgreeableness": true
/// }
/// ```
async fn solve(state: web::Data<AppState>, req: web::Json<SolveRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for solve request: field_errors={:?}", errors);
        return validation_failed(errors);
    }

    let params = request_params(&state, &req);
    let participants = req.into_inner().into_participants();
    let participant_count = participants.len();

    tracing::info!("Solving roommate matching for {} participants", participant_count);

    match solve_blocking(state.engine, participants, params).await {
        Ok((matching, _)) => {
            let response = SolveResponse {
                matching_id: uuid::Uuid::new_v4(),
                pairs: matching.pairs(),
                participant_count,
                solved_at: chrono::Utc::now(),
            };
            tracing::info!("Returning {} pairs (matching {})", response.pairs.len(), response.matching_id);
            HttpResponse::Ok().json(response)
        }
        Err(response) => response,
    }
}

/// Preferences endpoint
///
/// POST /api/v1/matches/preferences
///
/// Same body as the solve endpoint; returns every participant's ranking.
async fn preferences(state: web::Data<AppState>, req: web::Json<SolveRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let params = request_params(&state, &req);
    let participants = req.into_inner().into_participants();

    match derive_preferences(&participants, &params) {
        Ok(preferences) => HttpResponse::Ok().json(PreferencesResponse {
            preferences: preferences
                .into_iter()
                .map(|(key, ranking)| RankedList { key, ranking })
                .collect(),
        }),
        Err(e) => matching_error_response(&e),
    }
}

/// Roster endpoint
///
/// POST /api/v1/matches/roster
///
/// Solves the configured roster file and notifies every matched participant.
async fn solve_roster(state: web::Data<AppState>) -> impl Responder {
    let roster = match load_roster(&state.roster.path, state.roster.has_header).await {
        Ok(roster) => roster,
        Err(e) => {
            tracing::error!("Failed to load roster: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load roster".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };
    let participant_count = roster.len();

    let (matching, roster) = match solve_blocking(state.engine, roster, state.similarity).await {
        Ok(solved) => solved,
        Err(response) => return response,
    };

    let notifications = state.composer.match_notifications(&matching, &roster);
    let notifications_sent = if state.notifications_enabled {
        match deliver_all(state.sink.as_ref(), &notifications) {
            Ok(sent) => sent,
            Err(e) => {
                tracing::error!("Failed to deliver notifications: {}", e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to deliver notifications".to_string(),
                    message: e.to_string(),
                    status_code: 500,
                });
            }
        }
    } else {
        tracing::info!("Notifications disabled, composed {} without sending", notifications.len());
        0
    };

    HttpResponse::Ok().json(RosterResponse {
        pairs: matching.pairs(),
        participant_count,
        notifications_sent,
    })
}

fn request_params(state: &AppState, req: &SolveRequest) -> SimilarityParams {
    req.invert_agreeableness
        .map(|invert_agreeableness| SimilarityParams { invert_agreeableness })
        .unwrap_or(state.similarity)
}

/// Derive preferences and solve on the blocking pool
///
/// Hands the participants back alongside the matching.
async fn solve_blocking(
    engine: MatchingEngine,
    participants: Vec<Participant>,
    params: SimilarityParams,
) -> Result<(Matching, Vec<Participant>), HttpResponse> {
    let result = web::block(move || {
        let preferences = derive_preferences(&participants, &params)?;
        engine.solve(&preferences).map(|matching| (matching, participants))
    })
    .await;

    match result {
        Ok(Ok(solved)) => Ok(solved),
        Ok(Err(e)) => Err(matching_error_response(&e)),
        Err(e) => {
            tracing::error!("Solver task failed: {}", e);
            Err(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Solver task failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            }))
        }
    }
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn matching_error_response(err: &MatchingError) -> HttpResponse {
    match err {
        MatchingError::MalformedPreferences(_) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Malformed preferences".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        MatchingError::NoStableMatching { .. } => {
            tracing::warn!("{}", err);
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: "No stable matching".to_string(),
                message: err.to_string(),
                status_code: 422,
            })
        }
        MatchingError::InternalInvariant(_) | MatchingError::NotInList { .. } => {
            tracing::error!("Matching engine failure: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Matching engine failure".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}
