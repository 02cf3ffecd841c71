use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use tavola_catalog::scheduler;
use tavola_core::slot::SlotAvailability;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ResourceResponse {
    id: Uuid,
    name: String,
    capacity: u32,
    open: NaiveTime,
    close: NaiveTime,
    slot_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    resource_id: Uuid,
    date: NaiveDate,
    slots: Vec<SlotAvailability>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/resources", get(list_resources))
        .route("/v1/resources/{id}/availability", get(get_availability))
        .route("/v1/resources/{id}/stream", get(stream_events))
}

async fn list_resources(State(state): State<AppState>) -> Json<Vec<ResourceResponse>> {
    let resources = state
        .registry
        .list()
        .into_iter()
        .map(|r| ResourceResponse {
            id: r.id,
            name: r.name.clone(),
            capacity: r.capacity,
            open: r.open,
            close: r.close,
            slot_minutes: r.slot_minutes,
        })
        .collect();

    Json(resources)
}

/// GET /v1/resources/:id/availability?date=YYYY-MM-DD
/// Cached scheduler output for one resource and date.
async fn get_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let config = state
        .registry
        .get(&resource_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Resource not found: {}", resource_id)))?
        .clone();

    // 1. Fast path: cache hit
    if let Some(slots) = state.cache.get(resource_id, query.date).await {
        return Ok(Json(AvailabilityResponse {
            resource_id,
            date: query.date,
            slots,
        }));
    }

    // 2. Miss: recompute under the day lock so a racing write cannot leave
    // a stale fill behind its invalidation
    let _guard = state.locks.acquire(resource_id, query.date).await;

    if let Some(slots) = state.cache.get(resource_id, query.date).await {
        return Ok(Json(AvailabilityResponse {
            resource_id,
            date: query.date,
            slots,
        }));
    }

    let reservations = state
        .reservations
        .list_for_day(resource_id, query.date)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let slots = scheduler::compute_availability(&config, &reservations);
    state
        .cache
        .insert(resource_id, query.date, slots.clone())
        .await;

    Ok(Json(AvailabilityResponse {
        resource_id,
        date: query.date,
        slots,
    }))
}

/// GET /v1/resources/:id/stream
/// SSE stream of reservation events for one resource.
async fn stream_events(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>>, AppError> {
    if state.registry.get(&resource_id).is_none() {
        return Err(AppError::NotFoundError(format!(
            "Resource not found: {}",
            resource_id
        )));
    }

    let rx = state.events_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.resource_id == resource_id => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok::<_, std::convert::Infallible>(
                    Event::default().event("reservation").data(data),
                ))
            }
            _ => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
