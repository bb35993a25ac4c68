use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    AdjustCmd, BonusCmd, CreditOpCmd, DebitCmd, EngineError, ExpireCmd, LedgerEntry, OperationKind,
    Pet, PurchaseCmd, RefundCmd, ResultEngine, ledger, pets,
};

use super::{Engine, normalize_optional_text, with_tx};

/// A balance at or below this level (and above zero) triggers a low-balance
/// alert when crossed from above.
pub const LOW_CREDITS_THRESHOLD: i64 = 3;

/// Result of a successful credit operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditOutcome {
    pub previous_balance: i64,
    pub new_balance: i64,
    pub entry_id: Uuid,
}

/// Generates a fixed-kind credit operation (purchase, refund, bonus,
/// expiration).
macro_rules! impl_credit_op {
    ($(#[$meta:meta])* $fn_name:ident, $cmd_type:ty, $kind:expr, $sign:expr) => {
        $(#[$meta])*
        pub async fn $fn_name(&self, cmd: $cmd_type) -> ResultEngine<CreditOutcome> {
            if cmd.credits <= 0 {
                return Err(EngineError::InvalidArgument(
                    "credits must be > 0".to_string(),
                ));
            }
            self.perform_credit_operation(CreditOpCmd {
                pet_id: cmd.pet_id,
                delta: $sign * cmd.credits,
                kind: $kind,
                allow_negative: false,
                meta: cmd.meta,
                actor: cmd.actor,
            })
            .await
        }
    };
}

impl Engine {
    impl_credit_op!(
        /// Add purchased credits to a pet's balance.
        add_credits,
        PurchaseCmd,
        OperationKind::Purchase,
        1
    );

    impl_credit_op!(
        /// Return previously charged credits.
        ///
        /// A refund is modeled as its own `OperationKind::Refund` instead of a
        /// negative purchase, to keep the ledger explicit.
        refund_credits,
        RefundCmd,
        OperationKind::Refund,
        1
    );

    impl_credit_op!(
        /// Grant promotional credits.
        add_bonus_credits,
        BonusCmd,
        OperationKind::Bonus,
        1
    );

    impl_credit_op!(
        /// Remove lapsed credits.
        expire_credits,
        ExpireCmd,
        OperationKind::Expiration,
        -1
    );

    /// Debit credits for attendance; `kind` must be `checkin` or `checkout`.
    pub async fn debit_credits(&self, cmd: DebitCmd) -> ResultEngine<CreditOutcome> {
        if cmd.credits <= 0 {
            return Err(EngineError::InvalidArgument(
                "credits must be > 0".to_string(),
            ));
        }
        if !matches!(cmd.kind, OperationKind::Checkin | OperationKind::Checkout) {
            return Err(EngineError::InvalidArgument(format!(
                "debit kind must be checkin or checkout, got {}",
                cmd.kind.as_str()
            )));
        }
        self.perform_credit_operation(CreditOpCmd {
            pet_id: cmd.pet_id,
            delta: -cmd.credits,
            kind: cmd.kind,
            allow_negative: false,
            meta: cmd.meta,
            actor: cmd.actor,
        })
        .await
    }

    /// Administrative balance correction with a sign-free delta.
    ///
    /// The resulting balance may only go negative when the command explicitly
    /// allows it; without the flag an adjustment is rejected like any other
    /// kind.
    pub async fn adjust_credits(&self, cmd: AdjustCmd) -> ResultEngine<CreditOutcome> {
        self.perform_credit_operation(CreditOpCmd {
            pet_id: cmd.pet_id,
            delta: cmd.delta,
            kind: OperationKind::Adjustment,
            allow_negative: cmd.allow_negative,
            meta: cmd.meta,
            actor: cmd.actor,
        })
        .await
    }

    /// Atomically apply a balance change together with its ledger entry and
    /// any threshold notifications.
    pub async fn perform_credit_operation(&self, cmd: CreditOpCmd) -> ResultEngine<CreditOutcome> {
        with_tx!(self, |db_tx| {
            let outcome = self.apply_credit_operation(&db_tx, &cmd).await?;
            Ok(outcome)
        })
    }

    /// Credit-operation body, shared with the attendance transitions that
    /// debit inside their own transaction.
    pub(super) async fn apply_credit_operation(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CreditOpCmd,
    ) -> ResultEngine<CreditOutcome> {
        if cmd.delta == 0 {
            return Err(EngineError::InvalidArgument(
                "delta must not be 0".to_string(),
            ));
        }
        if cmd.allow_negative && cmd.kind != OperationKind::Adjustment {
            return Err(EngineError::InvalidArgument(
                "allow_negative is only valid for adjustments".to_string(),
            ));
        }
        self.require_user(db_tx, &cmd.actor).await?;
        let pet = Pet::try_from(self.require_pet(db_tx, cmd.pet_id).await?)?;

        let previous_balance = pet.credits;
        let new_balance = previous_balance + cmd.delta;
        if new_balance < 0 && !(cmd.kind == OperationKind::Adjustment && cmd.allow_negative) {
            return Err(EngineError::InsufficientCredits(pet.name));
        }

        // Balance write and ledger insert share the transaction; a failure in
        // either rolls back both.
        pets::ActiveModel {
            id: ActiveValue::Set(pet.id.to_string()),
            credits: ActiveValue::Set(new_balance),
            ..Default::default()
        }
        .update(db_tx)
        .await?;

        let description = normalize_optional_text(cmd.meta.description.as_deref())
            .unwrap_or_else(|| cmd.kind.default_description().to_string());
        let entry = LedgerEntry::new(
            pet.id,
            cmd.kind,
            cmd.delta.unsigned_abs() as i64,
            cmd.meta.amount_cents,
            description,
            cmd.actor.clone(),
            normalize_optional_text(cmd.meta.payment_ref.as_deref()),
            cmd.meta.occurred_at,
        )?;
        ledger::ActiveModel::from(&entry).insert(db_tx).await?;

        self.emit_threshold_notifications(
            db_tx,
            &pet,
            previous_balance,
            new_balance,
            cmd.meta.occurred_at,
        )
        .await;

        Ok(CreditOutcome {
            previous_balance,
            new_balance,
            entry_id: entry.id,
        })
    }

    /// Emit low-balance/depletion alerts when the balance crossed a
    /// threshold from above. Sink failures are logged and absorbed: alerting
    /// is best-effort, not part of the financial invariant.
    async fn emit_threshold_notifications(
        &self,
        db_tx: &DatabaseTransaction,
        pet: &Pet,
        previous_balance: i64,
        new_balance: i64,
        at: DateTime<Utc>,
    ) {
        if new_balance == 0 && previous_balance > 0 {
            if let Err(err) = self.sink.notify_depleted(db_tx, pet, at).await {
                tracing::warn!("depletion notification failed for pet {}: {err}", pet.id);
            }
        } else if new_balance > 0
            && new_balance <= LOW_CREDITS_THRESHOLD
            && previous_balance > LOW_CREDITS_THRESHOLD
        {
            if let Err(err) = self.sink.notify_low_balance(db_tx, pet, new_balance, at).await {
                tracing::warn!("low-balance notification failed for pet {}: {err}", pet.id);
            }
        }
    }

    /// Current balance of a pet.
    pub async fn credits_balance(&self, pet_id: Uuid) -> ResultEngine<i64> {
        let model = self.require_pet(&self.database, pet_id).await?;
        Ok(model.credits)
    }

    /// Whether a pet holds at least `required` credits.
    pub async fn has_credits(&self, pet_id: Uuid, required: i64) -> ResultEngine<bool> {
        Ok(self.credits_balance(pet_id).await? >= required)
    }

    /// Recent ledger entries for a pet, newest first.
    pub async fn ledger_entries(&self, pet_id: Uuid, limit: u64) -> ResultEngine<Vec<LedgerEntry>> {
        self.require_pet(&self.database, pet_id).await?;
        let models = ledger::Entity::find()
            .filter(ledger::Column::PetId.eq(pet_id.to_string()))
            .order_by_desc(ledger::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(LedgerEntry::try_from).collect()
    }
}
