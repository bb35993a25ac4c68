//! The module contains the `Pet` struct and its implementation.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Daycare presence state of a pet.
///
/// The only legal transitions are `Active -> CheckedIn` (check-in) and
/// `CheckedIn -> Active` (check-out).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    Active,
    CheckedIn,
}

impl PetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::CheckedIn => "checked_in",
        }
    }
}

impl TryFrom<&str> for PetStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "checked_in" => Ok(Self::CheckedIn),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid pet status: {other}"
            ))),
        }
    }
}

/// A pet enrolled in the daycare.
///
/// `credits` is the prepaid balance (one credit buys one day of attendance)
/// and `status` the presence state. Both are mutated exclusively through the
/// engine operations; every balance change is paired with a ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// Stable identifier, a UUID generated once and persisted as text, so the
    /// pet can be renamed without breaking references.
    pub id: Uuid,
    pub name: String,
    pub credits: i64,
    pub status: PetStatus,
}

impl Pet {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            credits: 0,
            status: PetStatus::Active,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub credits: i64,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerEntries,
    #[sea_orm(has_many = "super::attendance::Entity")]
    AttendanceEvents,
    #[sea_orm(has_many = "super::pet_tutors::Entity")]
    PetTutors,
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceEvents.def()
    }
}

impl Related<super::pet_tutors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetTutors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Pet> for ActiveModel {
    fn from(pet: &Pet) -> Self {
        Self {
            id: ActiveValue::Set(pet.id.to_string()),
            name: ActiveValue::Set(pet.name.clone()),
            credits: ActiveValue::Set(pet.credits),
            status: ActiveValue::Set(pet.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Pet {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("pet not exists".to_string()))?,
            name: model.name,
            credits: model.credits,
            status: PetStatus::try_from(model.status.as_str())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pet_starts_active_with_zero_credits() {
        let pet = Pet::new(String::from("Fido"));

        assert_eq!(pet.credits, 0);
        assert_eq!(pet.status, PetStatus::Active);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [PetStatus::Active, PetStatus::CheckedIn] {
            assert_eq!(PetStatus::try_from(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = PetStatus::try_from("boarding").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidArgument("invalid pet status: boarding".to_string())
        );
    }
}
