//! Attendance primitives.
//!
//! An `AttendanceEvent` is the calendar-visible record of a single check-in
//! or check-out instant. One event is created per transition.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceKind {
    Checkin,
    Checkout,
}

impl AttendanceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkin => "checkin",
            Self::Checkout => "checkout",
        }
    }
}

impl TryFrom<&str> for AttendanceKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checkin" => Ok(Self::Checkin),
            "checkout" => Ok(Self::Checkout),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid attendance kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub kind: AttendanceKind,
    /// Free text; a bypassed check-in stores `BYPASS: <reason>` here.
    pub note: Option<String>,
    pub created_by: String,
    pub occurred_at: DateTime<Utc>,
}

impl AttendanceEvent {
    pub fn new(
        pet_id: Uuid,
        kind: AttendanceKind,
        note: Option<String>,
        created_by: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id,
            kind,
            note,
            created_by,
            occurred_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pet_id: String,
    pub kind: String,
    pub note: Option<String>,
    pub created_by: String,
    pub occurred_at: DateTimeUtc,
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

impl From<&AttendanceEvent> for ActiveModel {
    fn from(event: &AttendanceEvent) -> Self {
        Self {
            id: ActiveValue::Set(event.id.to_string()),
            pet_id: ActiveValue::Set(event.pet_id.to_string()),
            kind: ActiveValue::Set(event.kind.as_str().to_string()),
            note: ActiveValue::Set(event.note.clone()),
            created_by: ActiveValue::Set(event.created_by.clone()),
            occurred_at: ActiveValue::Set(event.occurred_at),
        }
    }
}

impl TryFrom<Model> for AttendanceEvent {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("attendance event not exists".to_string()))?,
            pet_id: Uuid::parse_str(&model.pet_id)
                .map_err(|_| EngineError::KeyNotFound("pet not exists".to_string()))?,
            kind: AttendanceKind::try_from(model.kind.as_str())?,
            note: model.note,
            created_by: model.created_by,
            occurred_at: model.occurred_at,
        })
    }
}
