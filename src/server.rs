//! HTTP surface over [`GameService`].
//!
//! Version tokens travel in headers: responses carry `ETag`, move requests
//! present the last seen token in `If-Match`. Failures are rendered as
//! problem documents.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::game::{GameError, GameId, MoveRequest, RandomSource};
use crate::service::GameService;
use crate::store::GameStore;

/// Body of `POST /games`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct CreateGameRequest {
    /// Name of the player who moves first.
    pub player_x: String,
    /// Name of the second player.
    pub player_o: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ProblemDetails {
    title: String,
    status: u16,
    detail: String,
    instance: String,
}

#[derive(Debug)]
enum Failure {
    Game(GameError),
    /// Path or body could not be extracted.
    Malformed(String),
}

/// A failed request tied to the path that produced it.
#[derive(Debug)]
pub struct ApiError {
    failure: Failure,
    instance: String,
}

impl ApiError {
    fn new(error: GameError, uri: &Uri) -> Self {
        Self {
            failure: Failure::Game(error),
            instance: uri.path().to_string(),
        }
    }

    fn malformed(detail: String, uri: &Uri) -> Self {
        Self {
            failure: Failure::Malformed(detail),
            instance: uri.path().to_string(),
        }
    }

    fn status_and_title(&self) -> (StatusCode, &'static str) {
        let error = match &self.failure {
            Failure::Game(error) => error,
            Failure::Malformed(_) => return (StatusCode::BAD_REQUEST, "Malformed request"),
        };
        match error {
            GameError::PlayerValidation(_) => (StatusCode::BAD_REQUEST, "Invalid player"),
            GameError::GameNotFound(_) => (StatusCode::NOT_FOUND, "Game not found"),
            GameError::GameConflict(_) => (StatusCode::CONFLICT, "Conflict"),
            GameError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
            GameError::GameValidation(_)
            | GameError::InvalidCoordinates { .. }
            | GameError::CellAlreadyTaken { .. }
            | GameError::WrongTurn(_)
            | GameError::GameAlreadyFinished => (StatusCode::BAD_REQUEST, "Invalid move"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();
        // Storage details stay in the log.
        let detail = match self.failure {
            Failure::Game(error) if status.is_server_error() => {
                error!(%error, instance = %self.instance, "Request failed");
                "An unexpected error occurred".to_string()
            }
            Failure::Game(error) => {
                warn!(%error, instance = %self.instance, status = status.as_u16(), "Request rejected");
                error.to_string()
            }
            Failure::Malformed(detail) => {
                warn!(%detail, instance = %self.instance, "Malformed request");
                detail
            }
        };
        let body = ProblemDetails {
            title: title.to_string(),
            status: status.as_u16(),
            detail,
            instance: self.instance,
        };
        (status, Json(body)).into_response()
    }
}

/// Shared handler state.
pub type AppState<S, R> = Arc<GameService<S, R>>;

/// Builds the application router.
pub fn router<S, R>(service: AppState<S, R>) -> Router
where
    S: GameStore + 'static,
    R: RandomSource + Send + 'static,
{
    Router::new()
        .route("/games", post(create_game::<S, R>))
        .route("/games/{id}", get(get_game::<S, R>))
        .route("/moves", post(make_move::<S, R>))
        .route("/health", get(health))
        .with_state(service)
}

/// Extracts the version token from `If-Match`, tolerating quotes and a weak
/// `W/` prefix. A missing header yields an empty token.
pub fn if_match_token(headers: &HeaderMap) -> String {
    headers
        .get(header::IF_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            let raw = raw.trim();
            let raw = raw.strip_prefix("W/").unwrap_or(raw);
            raw.trim_matches('"').to_string()
        })
        .unwrap_or_default()
}

fn etag_header(token: &str) -> [(header::HeaderName, String); 1] {
    [(header::ETAG, format!("\"{}\"", token))]
}

#[instrument(skip(service, uri, body), fields(uri = %uri))]
async fn create_game<S, R>(
    State(service): State<AppState<S, R>>,
    uri: Uri,
    body: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: GameStore + 'static,
    R: RandomSource + Send + 'static,
{
    let Json(body) = body.map_err(|e| ApiError::malformed(e.body_text(), &uri))?;
    let view = service
        .create_game(&body.player_x, &body.player_o)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    info!(game_id = %view.id(), "Created game over HTTP");
    Ok((etag_header(view.etag()), Json(view)).into_response())
}

#[instrument(skip(service, uri, id), fields(uri = %uri))]
async fn get_game<S, R>(
    State(service): State<AppState<S, R>>,
    uri: Uri,
    id: Result<Path<GameId>, PathRejection>,
) -> Result<Response, ApiError>
where
    S: GameStore + 'static,
    R: RandomSource + Send + 'static,
{
    let Path(id) = id.map_err(|e| ApiError::malformed(e.body_text(), &uri))?;
    let view = service
        .get_game(id)
        .await
        .map_err(|e| ApiError::new(e, &uri))?
        .ok_or_else(|| ApiError::new(GameError::GameNotFound(id), &uri))?;
    Ok((etag_header(view.etag()), Json(view)).into_response())
}

#[instrument(skip(service, uri, headers, body), fields(uri = %uri))]
async fn make_move<S, R>(
    State(service): State<AppState<S, R>>,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: GameStore + 'static,
    R: RandomSource + Send + 'static,
{
    let Json(mut body) = body.map_err(|e| ApiError::malformed(e.body_text(), &uri))?;
    body.etag = if_match_token(&headers);
    let outcome = service
        .make_move(body)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    Ok((etag_header(outcome.etag()), Json(outcome)).into_response())
}

async fn health() -> &'static str {
    "ok"
}
