//! Command structs for engine operations.
//!
//! These types group parameters for write operations (credit mutations,
//! check-in/check-out, pet registration), keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::OperationKind;

/// Common metadata for ledger entry creation.
#[derive(Clone, Debug)]
pub struct EntryMeta {
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    pub payment_ref: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl EntryMeta {
    #[must_use]
    pub fn new(occurred_at: DateTime<Utc>) -> Self {
        Self {
            description: None,
            amount_cents: None,
            payment_ref: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn amount_cents(mut self, amount_cents: i64) -> Self {
        self.amount_cents = Some(amount_cents);
        self
    }

    #[must_use]
    pub fn payment_ref(mut self, payment_ref: impl Into<String>) -> Self {
        self.payment_ref = Some(payment_ref.into());
        self
    }
}

/// The fully general credit operation (signed delta, explicit kind).
///
/// Most callers go through the fixed-kind wrappers instead; this is the
/// contract used by the payment-completion collaborator and admin tooling.
#[derive(Clone, Debug)]
pub struct CreditOpCmd {
    pub pet_id: Uuid,
    pub delta: i64,
    pub kind: OperationKind,
    /// Only honored for [`OperationKind::Adjustment`]: permits the resulting
    /// balance to go negative (administrative debt tracking).
    pub allow_negative: bool,
    pub meta: EntryMeta,
    pub actor: String,
}

impl CreditOpCmd {
    #[must_use]
    pub fn new(
        pet_id: Uuid,
        actor: impl Into<String>,
        delta: i64,
        kind: OperationKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pet_id,
            delta,
            kind,
            allow_negative: false,
            meta: EntryMeta::new(occurred_at),
            actor: actor.into(),
        }
    }

    #[must_use]
    pub fn meta(mut self, meta: EntryMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Generates a fixed-kind command struct with the shared builder methods.
macro_rules! credit_cmd {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            pub pet_id: Uuid,
            /// Magnitude, always positive; the kind fixes the direction.
            pub credits: i64,
            pub meta: EntryMeta,
            pub actor: String,
        }

        impl $name {
            #[must_use]
            pub fn new(
                pet_id: Uuid,
                actor: impl Into<String>,
                credits: i64,
                occurred_at: DateTime<Utc>,
            ) -> Self {
                Self {
                    pet_id,
                    credits,
                    meta: EntryMeta::new(occurred_at),
                    actor: actor.into(),
                }
            }

            #[must_use]
            pub fn meta(mut self, meta: EntryMeta) -> Self {
                self.meta = meta;
                self
            }

            #[must_use]
            pub fn description(mut self, description: impl Into<String>) -> Self {
                self.meta.description = Some(description.into());
                self
            }
        }
    };
}

credit_cmd!(
    /// Add purchased credits (kind `purchase`).
    PurchaseCmd
);
credit_cmd!(
    /// Return previously charged credits (kind `refund`).
    RefundCmd
);
credit_cmd!(
    /// Grant promotional credits (kind `bonus`).
    BonusCmd
);
credit_cmd!(
    /// Remove lapsed credits (kind `expiration`).
    ExpireCmd
);

/// Debit credits for attendance (kind `checkin` or `checkout`).
#[derive(Clone, Debug)]
pub struct DebitCmd {
    pub pet_id: Uuid,
    pub credits: i64,
    pub kind: OperationKind,
    pub meta: EntryMeta,
    pub actor: String,
}

impl DebitCmd {
    #[must_use]
    pub fn new(
        pet_id: Uuid,
        actor: impl Into<String>,
        credits: i64,
        kind: OperationKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pet_id,
            credits,
            kind,
            meta: EntryMeta::new(occurred_at),
            actor: actor.into(),
        }
    }
}

/// Administrative balance correction (sign-free delta).
#[derive(Clone, Debug)]
pub struct AdjustCmd {
    pub pet_id: Uuid,
    pub delta: i64,
    pub allow_negative: bool,
    pub meta: EntryMeta,
    pub actor: String,
}

impl AdjustCmd {
    #[must_use]
    pub fn new(
        pet_id: Uuid,
        actor: impl Into<String>,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pet_id,
            delta,
            allow_negative: false,
            meta: EntryMeta::new(occurred_at),
            actor: actor.into(),
        }
    }

    /// Explicitly authorize a negative resulting balance.
    #[must_use]
    pub fn allow_negative(mut self) -> Self {
        self.allow_negative = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }
}

/// Check a pet in for the day.
#[derive(Clone, Debug)]
pub struct CheckInCmd {
    pub pet_id: Uuid,
    pub actor: String,
    /// Administrative override: permits check-in at zero balance and records
    /// why the credit check was skipped. Never fabricates credit.
    pub bypass_reason: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl CheckInCmd {
    #[must_use]
    pub fn new(pet_id: Uuid, actor: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            pet_id,
            actor: actor.into(),
            bypass_reason: None,
            notes: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn bypass_reason(mut self, reason: impl Into<String>) -> Self {
        self.bypass_reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Check a pet out at the end of the day.
#[derive(Clone, Debug)]
pub struct CheckOutCmd {
    pub pet_id: Uuid,
    pub actor: String,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl CheckOutCmd {
    #[must_use]
    pub fn new(pet_id: Uuid, actor: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            pet_id,
            actor: actor.into(),
            notes: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Enroll a new pet.
#[derive(Clone, Debug)]
pub struct RegisterPetCmd {
    pub name: String,
    pub actor: String,
    /// Seed balance, recorded as a `bonus` ledger entry when non-zero.
    pub starting_credits: i64,
    pub occurred_at: DateTime<Utc>,
}

impl RegisterPetCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, actor: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            actor: actor.into(),
            starting_credits: 0,
            occurred_at,
        }
    }

    #[must_use]
    pub fn starting_credits(mut self, credits: i64) -> Self {
        self.starting_credits = credits;
        self
    }
}
