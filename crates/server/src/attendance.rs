//! Check-in / check-out endpoints.

use api_types::attendance::{CheckIn, CheckInResult, CheckOut, CheckOutResult};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{ServerError, pets::map_pet, server::ServerState, user};
use engine::{CheckInCmd, CheckOutCmd};

pub async fn check_in(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CheckIn>,
) -> Result<Json<CheckInResult>, ServerError> {
    user::require_credit_manager(&user)?;
    // A bypass is an administrative override; staff cannot grant it.
    if payload.bypass_reason.is_some() {
        user::require_admin(&user)?;
    }

    let mut cmd = CheckInCmd::new(payload.pet_id, user.username.as_str(), Utc::now());
    if let Some(reason) = payload.bypass_reason {
        cmd = cmd.bypass_reason(reason);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let outcome = state.engine.check_in(cmd).await?;
    Ok(Json(CheckInResult {
        pet: map_pet(outcome.pet),
        event_id: outcome.event_id,
        ledger_entry_id: outcome.ledger_entry_id,
    }))
}

pub async fn check_out(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CheckOut>,
) -> Result<Json<CheckOutResult>, ServerError> {
    user::require_credit_manager(&user)?;

    let mut cmd = CheckOutCmd::new(payload.pet_id, user.username.as_str(), Utc::now());
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let outcome = state.engine.check_out(cmd).await?;
    Ok(Json(CheckOutResult {
        pet: map_pet(outcome.pet),
        event_id: outcome.event_id,
    }))
}
