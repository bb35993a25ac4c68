//! Ledger primitives.
//!
//! A `LedgerEntry` is the immutable, append-only record of a single
//! balance-affecting operation. Entries are created once per credit
//! operation and never updated or deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Purchase,
    Checkin,
    Checkout,
    Refund,
    Adjustment,
    Bonus,
    Expiration,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Checkin => "checkin",
            Self::Checkout => "checkout",
            Self::Refund => "refund",
            Self::Adjustment => "adjustment",
            Self::Bonus => "bonus",
            Self::Expiration => "expiration",
        }
    }

    /// Description used when the caller supplies none.
    pub fn default_description(self) -> &'static str {
        match self {
            Self::Purchase => "Credit purchase",
            Self::Checkin => "Daycare check-in",
            Self::Checkout => "Daycare check-out",
            Self::Refund => "Credit refund",
            Self::Adjustment => "Administrative adjustment",
            Self::Bonus => "Bonus credits",
            Self::Expiration => "Credit expiration",
        }
    }
}

impl TryFrom<&str> for OperationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "purchase" => Ok(Self::Purchase),
            "checkin" => Ok(Self::Checkin),
            "checkout" => Ok(Self::Checkout),
            "refund" => Ok(Self::Refund),
            "adjustment" => Ok(Self::Adjustment),
            "bonus" => Ok(Self::Bonus),
            "expiration" => Ok(Self::Expiration),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid operation kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub kind: OperationKind,
    /// Unsigned magnitude of the balance change; the direction is carried by
    /// `kind` together with the operation that created the entry.
    pub credits: i64,
    pub amount_cents: Option<i64>,
    pub description: String,
    pub created_by: String,
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pet_id: Uuid,
        kind: OperationKind,
        credits: i64,
        amount_cents: Option<i64>,
        description: String,
        created_by: String,
        payment_ref: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if credits <= 0 {
            return Err(EngineError::InvalidArgument(
                "credits magnitude must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            pet_id,
            kind,
            credits,
            amount_cents,
            description,
            created_by,
            payment_ref,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pet_id: String,
    pub kind: String,
    pub credits: i64,
    pub amount_cents: Option<i64>,
    pub description: String,
    pub created_by: String,
    pub payment_ref: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pets::Entity",
        from = "Column::PetId",
        to = "super::pets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Pets,
}

impl Related<super::pets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            pet_id: ActiveValue::Set(entry.pet_id.to_string()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            credits: ActiveValue::Set(entry.credits),
            amount_cents: ActiveValue::Set(entry.amount_cents),
            description: ActiveValue::Set(entry.description.clone()),
            created_by: ActiveValue::Set(entry.created_by.clone()),
            payment_ref: ActiveValue::Set(entry.payment_ref.clone()),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("ledger entry not exists".to_string()))?,
            pet_id: Uuid::parse_str(&model.pet_id)
                .map_err(|_| EngineError::KeyNotFound("pet not exists".to_string()))?,
            kind: OperationKind::try_from(model.kind.as_str())?,
            credits: model.credits,
            amount_cents: model.amount_cents,
            description: model.description,
            created_by: model.created_by,
            payment_ref: model.payment_ref,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            OperationKind::Purchase,
            OperationKind::Checkin,
            OperationKind::Checkout,
            OperationKind::Refund,
            OperationKind::Adjustment,
            OperationKind::Bonus,
            OperationKind::Expiration,
        ] {
            assert_eq!(OperationKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn zero_magnitude_entry_is_rejected() {
        let err = LedgerEntry::new(
            Uuid::new_v4(),
            OperationKind::Purchase,
            0,
            None,
            String::from("ten pack"),
            String::from("alice"),
            None,
            Utc.timestamp_opt(0, 0).unwrap(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            EngineError::InvalidArgument("credits magnitude must be > 0".to_string())
        );
    }
}
