use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use tavola_catalog::scheduler;
use tavola_core::events::{ReservationEvent, ReservationEventKind};
use tavola_core::reservation::{ContactInfo, Reservation, ReservationStatus};
use tavola_core::resource::ResourceConfig;
use tavola_core::slot;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub resource_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
    pub party_size: u32,
    pub contact: ContactInfo,
}

#[derive(Debug, Deserialize)]
pub struct ModifyReservationRequest {
    pub date: Option<NaiveDate>,
    pub slot_start: Option<NaiveTime>,
    pub party_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    pub resource_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
    pub party_size: u32,
    pub contact: ContactInfo,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            resource_id: r.resource_id,
            date: r.date,
            slot_start: r.slot_start,
            party_size: r.party_size,
            contact: r.contact,
            status: r.status.to_string(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(create_reservation).get(list_reservations))
        .route("/v1/reservations/{id}", get(get_reservation))
        .route("/v1/reservations/{id}/modify", post(modify_reservation))
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
}

fn validate_slot_request(
    state: &AppState,
    config: &ResourceConfig,
    date: NaiveDate,
    slot_start: NaiveTime,
    party_size: u32,
) -> Result<(), AppError> {
    if party_size == 0 {
        return Err(AppError::ValidationError("Party size must be at least 1".to_string()));
    }
    if party_size > state.rules.max_party_size {
        return Err(AppError::ValidationError(format!(
            "Party size {} exceeds the maximum of {}",
            party_size, state.rules.max_party_size
        )));
    }

    let today = Utc::now().date_naive();
    if date < today {
        return Err(AppError::ValidationError(format!("Date {} is in the past", date)));
    }
    let horizon = today + chrono::Duration::days(i64::from(state.rules.max_days_ahead));
    if date > horizon {
        return Err(AppError::ValidationError(format!(
            "Date {} is beyond the booking horizon ({} days)",
            date, state.rules.max_days_ahead
        )));
    }

    if !slot::is_on_grid(config, slot_start) {
        return Err(AppError::ValidationError(format!(
            "{} is not a bookable slot for {}",
            slot_start, config.name
        )));
    }

    Ok(())
}

/// POST /v1/reservations
/// Book a slot.
async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    // 1. Resolve the resource
    let config = state
        .registry
        .get(&req.resource_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Resource not found: {}", req.resource_id)))?
        .clone();

    // 2. Validate the request against configuration and booking rules
    validate_slot_request(&state, &config, req.date, req.slot_start, req.party_size)?;

    // 3. Serialize against other writers for this (resource, date)
    let _guard = state.locks.acquire(req.resource_id, req.date).await;

    // 4. Capacity check over current store contents
    let existing = state
        .reservations
        .list_for_day(req.resource_id, req.date)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let remaining = scheduler::remaining_for_slot(&config, &existing, req.slot_start);
    if req.party_size > remaining {
        return Err(AppError::ConflictError(format!(
            "Slot {} has {} seats left, requested {}",
            req.slot_start, remaining, req.party_size
        )));
    }

    // 5. Persist
    let reservation = Reservation::new(
        req.resource_id,
        req.date,
        req.slot_start,
        req.party_size,
        req.contact,
    );
    state
        .reservations
        .insert(reservation.clone())
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    // 6. Invalidate availability for this key
    state.cache.invalidate(req.resource_id, req.date).await;

    // 7. Publish event
    let _ = state.events_tx.send(ReservationEvent {
        kind: ReservationEventKind::Created,
        reservation_id: reservation.id,
        resource_id: reservation.resource_id,
        date: reservation.date,
        slot_start: reservation.slot_start,
        party_size: reservation.party_size,
        occurred_at: Utc::now().timestamp(),
    });

    info!("Reservation created: {}", reservation.id);

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

/// GET /v1/reservations/:id
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state
        .reservations
        .get(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Reservation not found: {}", id)))?;

    Ok(Json(reservation.into()))
}

/// GET /v1/reservations?resource_id=..&date=..
async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let reservations = match (query.resource_id, query.date) {
        (Some(resource_id), Some(date)) => state
            .reservations
            .list_for_day(resource_id, date)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?,
        _ => {
            let all = state
                .reservations
                .list()
                .await
                .map_err(|e| AppError::InternalServerError(e.to_string()))?;
            all.into_iter()
                .filter(|r| query.resource_id.map_or(true, |id| r.resource_id == id))
                .filter(|r| query.date.map_or(true, |d| r.date == d))
                .collect()
        }
    };

    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

/// POST /v1/reservations/:id/modify
/// Move a reservation to another date/slot or change the party size.
async fn modify_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ModifyReservationRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    loop {
        // 1. Fetch the reservation to learn which day keys to lock
        let current = state
            .reservations
            .get(id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .ok_or_else(|| AppError::NotFoundError(format!("Reservation not found: {}", id)))?;

        if current.status == ReservationStatus::Cancelled {
            return Err(AppError::ConflictError(format!(
                "Reservation {} is cancelled",
                id
            )));
        }

        let config = state
            .registry
            .get(&current.resource_id)
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "Resource not found: {}",
                    current.resource_id
                ))
            })?
            .clone();

        // 2. Resolve the target slot and validate it
        let new_date = req.date.unwrap_or(current.date);
        let new_slot = req.slot_start.unwrap_or(current.slot_start);
        let new_party = req.party_size.unwrap_or(current.party_size);

        validate_slot_request(&state, &config, new_date, new_slot, new_party)?;

        // 3. Lock old and new day keys in sorted order
        let guards = state
            .locks
            .acquire_pair(
                (current.resource_id, current.date),
                (current.resource_id, new_date),
            )
            .await;

        // 4. Re-read under the lock; a concurrent modify may have moved the
        // reservation off the day we locked, in which case retry
        let latest = state
            .reservations
            .get(id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .ok_or_else(|| AppError::NotFoundError(format!("Reservation not found: {}", id)))?;

        if latest.date != current.date {
            drop(guards);
            continue;
        }

        if latest.status == ReservationStatus::Cancelled {
            return Err(AppError::ConflictError(format!(
                "Reservation {} is cancelled",
                id
            )));
        }

        // 5. Capacity check at the target, excluding this reservation's own seats
        let target_day = state
            .reservations
            .list_for_day(latest.resource_id, new_date)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        let others: Vec<_> = target_day.into_iter().filter(|r| r.id != id).collect();

        let remaining = scheduler::remaining_for_slot(&config, &others, new_slot);
        if new_party > remaining {
            return Err(AppError::ConflictError(format!(
                "Slot {} has {} seats left, requested {}",
                new_slot, remaining, new_party
            )));
        }

        // 6. Persist the updated record
        let old_date = latest.date;
        let mut updated = latest;
        updated.date = new_date;
        updated.slot_start = new_slot;
        updated.party_size = new_party;
        updated.status = ReservationStatus::Modified;
        updated.updated_at = Utc::now();

        state
            .reservations
            .update(updated.clone())
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        // 7. Invalidate both affected keys
        state.cache.invalidate(updated.resource_id, old_date).await;
        state.cache.invalidate(updated.resource_id, new_date).await;

        // 8. Publish event
        let _ = state.events_tx.send(ReservationEvent {
            kind: ReservationEventKind::Modified,
            reservation_id: updated.id,
            resource_id: updated.resource_id,
            date: updated.date,
            slot_start: updated.slot_start,
            party_size: updated.party_size,
            occurred_at: Utc::now().timestamp(),
        });

        info!("Reservation modified: {}", updated.id);

        return Ok(Json(updated.into()));
    }
}

/// POST /v1/reservations/:id/cancel
/// Idempotent: cancelling a cancelled reservation is a no-op.
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    loop {
        // 1. Fetch to learn which day key to lock
        let current = state
            .reservations
            .get(id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .ok_or_else(|| AppError::NotFoundError(format!("Reservation not found: {}", id)))?;

        if current.status == ReservationStatus::Cancelled {
            return Ok(StatusCode::NO_CONTENT);
        }

        let guard = state.locks.acquire(current.resource_id, current.date).await;

        // 2. Re-read under the lock; a concurrent modify may have moved the
        // reservation to a different day, in which case we locked the wrong
        // key and must retry on the fresh one
        let latest = state
            .reservations
            .get(id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .ok_or_else(|| AppError::NotFoundError(format!("Reservation not found: {}", id)))?;

        if latest.date != current.date {
            drop(guard);
            continue;
        }

        if latest.status == ReservationStatus::Cancelled {
            return Ok(StatusCode::NO_CONTENT);
        }

        // 3. Mark cancelled
        let mut cancelled = latest;
        cancelled.status = ReservationStatus::Cancelled;
        cancelled.updated_at = Utc::now();

        state
            .reservations
            .update(cancelled.clone())
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        // 4. Release the seats in the availability cache
        state
            .cache
            .invalidate(cancelled.resource_id, cancelled.date)
            .await;

        // 5. Publish event
        let _ = state.events_tx.send(ReservationEvent {
            kind: ReservationEventKind::Cancelled,
            reservation_id: cancelled.id,
            resource_id: cancelled.resource_id,
            date: cancelled.date,
            slot_start: cancelled.slot_start,
            party_size: cancelled.party_size,
            occurred_at: Utc::now().timestamp(),
        });

        info!("Reservation cancelled: {}", cancelled.id);

        return Ok(StatusCode::NO_CONTENT);
    }
}
