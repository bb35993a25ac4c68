use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AttendanceEvent, AttendanceKind, CheckInCmd, CheckOutCmd, CreditOpCmd, EngineError, EntryMeta,
    OperationKind, Pet, PetStatus, ResultEngine, activity_notes, attendance, pets,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Result of a successful check-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckInOutcome {
    pub pet: Pet,
    pub event_id: Uuid,
    /// Absent when a bypassed check-in floored the debit at zero balance.
    pub ledger_entry_id: Option<Uuid>,
}

/// Result of a successful check-out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOutOutcome {
    pub pet: Pet,
    pub event_id: Uuid,
}

/// Combined free text for the activity note created alongside a transition.
fn activity_body(bypass_reason: &Option<String>, notes: &Option<String>) -> Option<String> {
    match (bypass_reason, notes) {
        (Some(reason), Some(notes)) => Some(format!("BYPASS: {reason}; {notes}")),
        (Some(reason), None) => Some(format!("BYPASS: {reason}")),
        (None, Some(notes)) => Some(notes.clone()),
        (None, None) => None,
    }
}

impl Engine {
    /// Check a pet in: `active -> checked_in`, debit one credit, record the
    /// calendar event, all in one transaction.
    ///
    /// Repeating a check-in fails loudly with `InvalidTransition` instead of
    /// silently succeeding, so callers can tell "already done" apart from
    /// "just happened".
    pub async fn check_in(&self, cmd: CheckInCmd) -> ResultEngine<CheckInOutcome> {
        with_tx!(self, |db_tx| self.apply_check_in(&db_tx, &cmd).await)
    }

    /// Check a pet out: `checked_in -> active` plus the calendar event. The
    /// balance is untouched; debiting happens at check-in only.
    pub async fn check_out(&self, cmd: CheckOutCmd) -> ResultEngine<CheckOutOutcome> {
        with_tx!(self, |db_tx| self.apply_check_out(&db_tx, &cmd).await)
    }

    async fn apply_check_in(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CheckInCmd,
    ) -> ResultEngine<CheckInOutcome> {
        self.require_user(db_tx, &cmd.actor).await?;
        let pet = Pet::try_from(self.require_pet(db_tx, cmd.pet_id).await?)?;
        if pet.status == PetStatus::CheckedIn {
            return Err(EngineError::InvalidTransition(format!(
                "{} is already checked in",
                pet.name
            )));
        }

        let bypass_reason = normalize_optional_text(cmd.bypass_reason.as_deref());
        let notes = normalize_optional_text(cmd.notes.as_deref());
        if pet.credits <= 0 && bypass_reason.is_none() {
            return Err(EngineError::InsufficientCredits(pet.name));
        }

        pets::ActiveModel {
            id: ActiveValue::Set(pet.id.to_string()),
            status: ActiveValue::Set(PetStatus::CheckedIn.as_str().to_string()),
            ..Default::default()
        }
        .update(db_tx)
        .await?;

        // A bypassed check-in at zero balance floors the debit: no balance
        // change, no ledger entry. A bypass never fabricates credit.
        let ledger_entry_id = if pet.credits > 0 {
            let outcome = self
                .apply_credit_operation(
                    db_tx,
                    &CreditOpCmd {
                        pet_id: pet.id,
                        delta: -1,
                        kind: OperationKind::Checkin,
                        allow_negative: false,
                        meta: EntryMeta::new(cmd.occurred_at),
                        actor: cmd.actor.clone(),
                    },
                )
                .await?;
            Some(outcome.entry_id)
        } else {
            None
        };

        let note = match &bypass_reason {
            Some(reason) => Some(format!("BYPASS: {reason}")),
            None => notes.clone(),
        };
        let event = AttendanceEvent::new(
            pet.id,
            AttendanceKind::Checkin,
            note,
            cmd.actor.clone(),
            cmd.occurred_at,
        );
        attendance::ActiveModel::from(&event).insert(db_tx).await?;

        if let Some(body) = activity_body(&bypass_reason, &notes) {
            activity_notes::active_model(pet.id, body, &cmd.actor, cmd.occurred_at)
                .insert(db_tx)
                .await?;
        }

        let pet = Pet::try_from(self.require_pet(db_tx, cmd.pet_id).await?)?;
        Ok(CheckInOutcome {
            pet,
            event_id: event.id,
            ledger_entry_id,
        })
    }

    async fn apply_check_out(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CheckOutCmd,
    ) -> ResultEngine<CheckOutOutcome> {
        self.require_user(db_tx, &cmd.actor).await?;
        let pet = Pet::try_from(self.require_pet(db_tx, cmd.pet_id).await?)?;
        if pet.status != PetStatus::CheckedIn {
            return Err(EngineError::InvalidTransition(format!(
                "{} is not checked in",
                pet.name
            )));
        }

        let notes = normalize_optional_text(cmd.notes.as_deref());

        pets::ActiveModel {
            id: ActiveValue::Set(pet.id.to_string()),
            status: ActiveValue::Set(PetStatus::Active.as_str().to_string()),
            ..Default::default()
        }
        .update(db_tx)
        .await?;

        let event = AttendanceEvent::new(
            pet.id,
            AttendanceKind::Checkout,
            notes.clone(),
            cmd.actor.clone(),
            cmd.occurred_at,
        );
        attendance::ActiveModel::from(&event).insert(db_tx).await?;

        if let Some(body) = notes {
            activity_notes::active_model(pet.id, body, &cmd.actor, cmd.occurred_at)
                .insert(db_tx)
                .await?;
        }

        let pet = Pet::try_from(self.require_pet(db_tx, cmd.pet_id).await?)?;
        Ok(CheckOutOutcome {
            pet,
            event_id: event.id,
        })
    }
}
