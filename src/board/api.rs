use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};

use super::graphql::BoardSchema;
use super::models::{CardMove, CardUpdate, PositionUpdate};
use super::store::DbHandle;
use crate::errors::{BoardError, ErrorKind};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub schema: BoardSchema,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: DbHandle) -> Self {
        let schema = super::graphql::create_schema(db.clone());
        Self { db, schema }
    }
}

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Deserialize)]
pub struct CreateCardRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct PositionRequest {
    pub position: i64,
}

#[derive(Deserialize)]
pub struct ColumnPositionsRequest {
    pub columns: Vec<PositionUpdate>,
}

#[derive(Deserialize)]
pub struct CardPositionsRequest {
    pub cards: Vec<PositionUpdate>,
}

#[derive(Serialize)]
pub struct BulkResult {
    pub success: bool,
    pub updated: usize,
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    Internal(String),
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound(msg),
            ErrorKind::Conflict => ApiError::Conflict(msg),
            ErrorKind::Validation => ApiError::BadRequest(msg),
            ErrorKind::Internal => {
                tracing::error!(error = %msg, "board operation failed");
                ApiError::Internal(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/kanban/board", get(get_board))
        .route("/kanban/columns", post(create_column))
        .route("/kanban/columns/positions", put(update_column_positions))
        .route(
            "/kanban/columns/{id}",
            delete(delete_column).patch(update_column),
        )
        .route("/kanban/columns/{id}/position", put(move_column))
        .route("/kanban/columns/{id}/cards", post(create_card))
        .route(
            "/kanban/columns/{id}/cards/positions",
            put(update_card_positions),
        )
        .route("/kanban/cards/{id}", put(update_card).delete(delete_card))
        .route("/kanban/cards/{id}/move", put(move_card))
        .route("/kanban/cards/{id}/position", put(update_card_position))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_board(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let board = state.db.call(|db| db.get_board()).await?;
    Ok(Json(board))
}

async fn create_column(
    State(state): State<SharedState>,
    Json(req): Json<TitleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let column = state
        .db
        .call(move |db| db.append_column(&req.title))
        .await?;
    tracing::debug!(column_id = %column.id, position = column.position, "column created");
    Ok((StatusCode::CREATED, Json(column)))
}

async fn update_column(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<TitleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let column = state
        .db
        .call(move |db| db.update_column_title(&id, &req.title))
        .await?;
    Ok(Json(column))
}

async fn delete_column(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.call(move |db| db.delete_column(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_column_positions(
    State(state): State<SharedState>,
    Json(req): Json<ColumnPositionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .db
        .call(move |db| db.reposition_columns(&req.columns))
        .await?;
    Ok(Json(BulkResult {
        success: true,
        updated,
    }))
}

async fn move_column(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<PositionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let column = state
        .db
        .call(move |db| db.move_column(&id, req.position))
        .await?;
    Ok(Json(column))
}

async fn create_card(
    State(state): State<SharedState>,
    Path(column_id): Path<String>,
    Json(req): Json<CreateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .db
        .call(move |db| db.append_card(&column_id, &req.title, &req.description))
        .await?;
    tracing::debug!(card_id = %card.id, column_id = %card.column_id, "card created");
    Ok((StatusCode::CREATED, Json(card)))
}

async fn update_card_positions(
    State(state): State<SharedState>,
    Path(column_id): Path<String>,
    Json(req): Json<CardPositionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .db
        .call(move |db| db.reposition_cards(&column_id, &req.cards))
        .await?;
    Ok(Json(BulkResult {
        success: true,
        updated,
    }))
}

async fn delete_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.call(move |db| db.delete_card(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<CardMove>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.db.call(move |db| db.move_card(&id, &req)).await?;
    Ok(Json(card))
}

async fn update_card_position(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<PositionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .call(move |db| db.reposition_card(&id, req.position))
        .await?;
    Ok(Json(serde_json::json!({"success": true})))
}

async fn update_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<CardUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.db.call(move |db| db.update_card(&id, &req)).await?;
    Ok(Json(card))
}
