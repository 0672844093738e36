use crate::errors::AppError;
use crate::lifecycle;
use crate::models::{
    ActualPoint, ChartPoint, Event, MessageResponse, Period, PredictedEntry, PredictedPoint,
    RecalibrateResponse, Serving,
};
use crate::records::{self, UPCOMING_LIMIT};
use crate::series::{actual_series, assemble_chart, live_point, predicted_series};
use crate::state::AppState;
use crate::storage::DocumentKey;
use crate::trainer::recalibrate as run_trainer;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub upcoming: bool,
}

pub async fn list_servings(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(records::list_servings(&state.store).await?))
}

pub async fn add_serving(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<MessageResponse>, AppError> {
    let serving: Serving = serde_json::from_value(payload)
        .map_err(|err| AppError::bad_request(format!("Invalid serving: {err}")))?;
    serving
        .validate()
        .map_err(|reason| AppError::bad_request(format!("Invalid serving: {reason}")))?;

    records::add_serving(&state.store, serving).await?;
    Ok(Json(MessageResponse::new("Added")))
}

pub async fn delete_serving(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    records::remove_servings(&state.store, &name).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}

pub async fn archive(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    lifecycle::archive(&state.store).await?;
    Ok(Json(MessageResponse::new("Archived")))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    lifecycle::reset(&state.store).await?;
    Ok(Json(MessageResponse::new("Cleared")))
}

pub async fn actual(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Vec<ActualPoint>>, AppError> {
    let period = parse_period(&period)?;
    let history: Vec<Value> = state.store.read(DocumentKey::History).await?;
    Ok(Json(actual_series(history, period)))
}

pub async fn predicted(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Vec<PredictedPoint>>, AppError> {
    let period = parse_period(&period)?;
    let entries: Vec<PredictedEntry> = state.store.read(period.predicted_key()).await?;
    Ok(Json(predicted_series(entries, period)))
}

pub async fn chart(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Vec<ChartPoint>>, AppError> {
    let period = parse_period(&period)?;
    let history: Vec<Value> = state.store.read(DocumentKey::History).await?;
    let entries: Vec<PredictedEntry> = state.store.read(period.predicted_key()).await?;
    let today = records::list_servings(&state.store).await?;

    let live = live_point(lifecycle::archive_date(), &today);
    Ok(Json(assemble_chart(
        actual_series(history, period),
        predicted_series(entries, period),
        Some(live),
    )))
}

pub async fn metrics(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Value>, AppError> {
    let period = parse_period(&period)?;
    Ok(Json(state.store.read_summary(period.metrics_key()).await?))
}

/// All events, or with `?upcoming=true` the next few from today on.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let events = records::list_events(&state.store).await?;
    if !query.upcoming {
        return Ok(Json(events));
    }
    Ok(Json(records::upcoming_events(
        events,
        records::local_today(),
        UPCOMING_LIMIT,
    )))
}

pub async fn add_event(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<MessageResponse>, AppError> {
    let event: Event = serde_json::from_value(payload)
        .map_err(|err| AppError::bad_request(format!("Invalid event: {err}")))?;

    records::add_event(&state.store, event).await?;
    Ok(Json(MessageResponse::new("Event added")))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    records::remove_events(&state.store, &id).await?;
    Ok(Json(MessageResponse::new("Event deleted")))
}

pub async fn recalibrate(
    State(state): State<AppState>,
) -> Result<Json<RecalibrateResponse>, AppError> {
    let output = run_trainer(state.trainer.as_ref()).await?;
    Ok(Json(RecalibrateResponse {
        message: "Recalibration complete".to_string(),
        output,
    }))
}

pub async fn api_not_found() -> AppError {
    AppError::not_found()
}

fn parse_period(value: &str) -> Result<Period, AppError> {
    value.parse().map_err(|_| AppError::invalid_period())
}
