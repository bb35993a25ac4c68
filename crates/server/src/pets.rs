//! Pet endpoints: registration, snapshots and per-pet feeds.

use api_types::Severity as ApiSeverity;
use api_types::attendance::{AttendanceEventView, AttendanceKind as ApiAttendanceKind, AttendanceListResponse};
use api_types::credits::{LedgerEntryView, LedgerListResponse, OperationKind as ApiKind};
use api_types::eligibility::{Alert, AlertKind as ApiAlertKind, EligibilityResponse};
use api_types::pet::{
    BalanceView, PetRegister, PetStatus as ApiStatus, PetView, TutorAssign, TutorListResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::RegisterPetCmd;

/// Per-pet feeds are capped; pagination belongs to the reporting surface.
const LIST_LIMIT: u64 = 100;

pub(crate) fn map_pet(pet: engine::Pet) -> PetView {
    PetView {
        id: pet.id,
        name: pet.name,
        credits: pet.credits,
        status: match pet.status {
            engine::PetStatus::Active => ApiStatus::Active,
            engine::PetStatus::CheckedIn => ApiStatus::CheckedIn,
        },
    }
}

pub(crate) fn map_kind(kind: engine::OperationKind) -> ApiKind {
    match kind {
        engine::OperationKind::Purchase => ApiKind::Purchase,
        engine::OperationKind::Checkin => ApiKind::Checkin,
        engine::OperationKind::Checkout => ApiKind::Checkout,
        engine::OperationKind::Refund => ApiKind::Refund,
        engine::OperationKind::Adjustment => ApiKind::Adjustment,
        engine::OperationKind::Bonus => ApiKind::Bonus,
        engine::OperationKind::Expiration => ApiKind::Expiration,
    }
}

pub(crate) fn map_severity(severity: engine::Severity) -> ApiSeverity {
    match severity {
        engine::Severity::Info => ApiSeverity::Info,
        engine::Severity::Warning => ApiSeverity::Warning,
        engine::Severity::Error => ApiSeverity::Error,
    }
}

fn map_alert_kind(kind: engine::AlertKind) -> ApiAlertKind {
    match kind {
        engine::AlertKind::PetNotFound => ApiAlertKind::PetNotFound,
        engine::AlertKind::AlreadyCheckedIn => ApiAlertKind::AlreadyCheckedIn,
        engine::AlertKind::NoCredits => ApiAlertKind::NoCredits,
        engine::AlertKind::LowCredits => ApiAlertKind::LowCredits,
    }
}

pub async fn register(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PetRegister>,
) -> Result<Json<PetView>, ServerError> {
    user::require_credit_manager(&user)?;

    let mut cmd = RegisterPetCmd::new(payload.name, user.username.as_str(), Utc::now());
    if let Some(credits) = payload.starting_credits {
        cmd = cmd.starting_credits(credits);
    }

    let pet = state.engine.register_pet(cmd).await?;
    Ok(Json(map_pet(pet)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PetView>, ServerError> {
    let pet = state.engine.pet(id).await?;
    Ok(Json(map_pet(pet)))
}

pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceView>, ServerError> {
    let credits = state.engine.credits_balance(id).await?;
    Ok(Json(BalanceView {
        pet_id: id,
        credits,
    }))
}

pub async fn eligibility(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EligibilityResponse>, ServerError> {
    let eligibility = state.engine.validate_check_in(id).await?;
    Ok(Json(EligibilityResponse {
        can_check_in: eligibility.can_check_in,
        alerts: eligibility
            .alerts
            .into_iter()
            .map(|alert| Alert {
                kind: map_alert_kind(alert.kind),
                severity: map_severity(alert.severity),
                message: alert.message,
                blocking: alert.blocking,
            })
            .collect(),
    }))
}

pub async fn ledger(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LedgerListResponse>, ServerError> {
    let entries = state.engine.ledger_entries(id, LIST_LIMIT).await?;
    Ok(Json(LedgerListResponse {
        entries: entries
            .into_iter()
            .map(|entry| LedgerEntryView {
                id: entry.id,
                kind: map_kind(entry.kind),
                credits: entry.credits,
                amount_cents: entry.amount_cents,
                description: entry.description,
                created_by: entry.created_by,
                payment_ref: entry.payment_ref,
                created_at: entry.created_at.fixed_offset(),
            })
            .collect(),
    }))
}

pub async fn events(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceListResponse>, ServerError> {
    let events = state.engine.attendance_events(id, LIST_LIMIT).await?;
    Ok(Json(AttendanceListResponse {
        events: events
            .into_iter()
            .map(|event| AttendanceEventView {
                id: event.id,
                kind: match event.kind {
                    engine::AttendanceKind::Checkin => ApiAttendanceKind::Checkin,
                    engine::AttendanceKind::Checkout => ApiAttendanceKind::Checkout,
                },
                note: event.note,
                created_by: event.created_by,
                occurred_at: event.occurred_at.fixed_offset(),
            })
            .collect(),
    }))
}

pub async fn tutors(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TutorListResponse>, ServerError> {
    let tutors = state.engine.tutors_of(id).await?;
    Ok(Json(TutorListResponse { tutors }))
}

pub async fn assign_tutor(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TutorAssign>,
) -> Result<StatusCode, ServerError> {
    user::require_credit_manager(&user)?;
    state.engine.assign_tutor(id, &payload.username).await?;
    Ok(StatusCode::CREATED)
}
