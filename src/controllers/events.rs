use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::controllers::params::{DateRangeQuery, EventForm};
use crate::error::ApiError;
use crate::models::Event;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/event", get(list_events).post(create_event))
        .route("/event/today", get(todays_events))
        .route("/event/{id}", get(get_event).delete(delete_event))
}

#[derive(Debug, Serialize)]
pub struct EventCreatedResponse {
    pub message: &'static str,
    pub event: String,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// GET /event, GET /
async fn list_events(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let events = match query.into_range()? {
        None => state.store.list_all().await?,
        Some(range) => {
            debug!("Listing events between {} and {}", range.start, range.end);
            state.store.list_between(range.start, range.end).await?
        }
    };

    Ok(Json(events))
}

// POST /event, POST /
async fn create_event(
    State(state): State<Arc<AppState>>,
    form: EventForm,
) -> Result<Json<EventCreatedResponse>, ApiError> {
    let new_event = form.into_new_event()?;
    let event = state.store.create(&new_event).await?;
    info!("Created event {} on {}", event.id, event.date);

    // Echoes the submitted values, not the id.
    Ok(Json(EventCreatedResponse {
        message: "The event has been added!",
        event: event.name,
        date: event.date,
    }))
}

// GET /event/today
async fn todays_events(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Event>>, ApiError> {
    let today = Local::now().date_naive();
    debug!("Listing events for {}", today);
    Ok(Json(state.store.list_on(today).await?))
}

// GET /event/{id}
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id = parse_id(&id)?;
    debug!("Fetching event {}", id);

    state
        .store
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

// DELETE /event/{id}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete_by_id(id).await? {
        return Err(ApiError::NotFound);
    }
    info!("Deleted event {}", id);

    Ok(Json(MessageResponse {
        message: "The event has been deleted!",
    }))
}

// Only plain unsigned digits can name an event.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}
