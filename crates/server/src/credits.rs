//! Credit mutation endpoints.
//!
//! The fixed-kind mutations (purchase/refund/bonus/expiration) are open to
//! staff; adjustments are admin-only because they may drive a balance
//! negative.

use api_types::credits::{CreditAdjust, CreditMutation, CreditResult};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};
use engine::{AdjustCmd, EntryMeta};

fn entry_meta(payload: &CreditMutation) -> EntryMeta {
    let mut meta = EntryMeta::new(Utc::now());
    if let Some(description) = &payload.description {
        meta = meta.description(description.clone());
    }
    if let Some(amount_cents) = payload.amount_cents {
        meta = meta.amount_cents(amount_cents);
    }
    if let Some(payment_ref) = &payload.payment_ref {
        meta = meta.payment_ref(payment_ref.clone());
    }
    meta
}

fn map_outcome(outcome: engine::CreditOutcome) -> CreditResult {
    CreditResult {
        previous_balance: outcome.previous_balance,
        new_balance: outcome.new_balance,
        entry_id: outcome.entry_id,
    }
}

/// Generates a fixed-kind credit mutation handler.
macro_rules! credit_mutation_handler {
    ($fn_name:ident, $cmd:ident, $method:ident) => {
        pub async fn $fn_name(
            Extension(user): Extension<user::Model>,
            State(state): State<ServerState>,
            Json(payload): Json<CreditMutation>,
        ) -> Result<Json<CreditResult>, ServerError> {
            user::require_credit_manager(&user)?;
            let cmd = engine::$cmd::new(
                payload.pet_id,
                user.username.as_str(),
                payload.credits,
                Utc::now(),
            )
            .meta(entry_meta(&payload));
            let outcome = state.engine.$method(cmd).await?;
            Ok(Json(map_outcome(outcome)))
        }
    };
}

credit_mutation_handler!(purchase, PurchaseCmd, add_credits);
credit_mutation_handler!(refund, RefundCmd, refund_credits);
credit_mutation_handler!(bonus, BonusCmd, add_bonus_credits);
credit_mutation_handler!(expiration, ExpireCmd, expire_credits);

pub async fn adjustment(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CreditAdjust>,
) -> Result<Json<CreditResult>, ServerError> {
    user::require_admin(&user)?;

    let mut cmd = AdjustCmd::new(
        payload.pet_id,
        user.username.as_str(),
        payload.delta,
        Utc::now(),
    );
    if payload.allow_negative.unwrap_or(false) {
        cmd = cmd.allow_negative();
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let outcome = state.engine.adjust_credits(cmd).await?;
    Ok(Json(map_outcome(outcome)))
}
