//! Notification records addressed to tutors and administrators.
//!
//! The engine only decides *when* and *for whom* a notification exists;
//! delivery (push, messaging, email) and the read/dismiss lifecycle belong
//! to the inbox collaborator, which is why `read_at` is never written here.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl TryFrom<&str> for Severity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, EngineError> {
        match value {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid severity: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub username: String,
    pub pet_id: Uuid,
    pub severity: Severity,
    pub message: String,
    pub action_hint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(
        username: String,
        pet_id: Uuid,
        severity: Severity,
        message: String,
        action_hint: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            pet_id,
            severity,
            message,
            action_hint,
            created_at,
            read_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub pet_id: String,
    pub severity: String,
    pub message: String,
    pub action_hint: Option<String>,
    pub created_at: DateTimeUtc,
    pub read_at: Option<DateTimeUtc>,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Username",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::pets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pets.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Notification> for ActiveModel {
    fn from(notification: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(notification.id.to_string()),
            username: ActiveValue::Set(notification.username.clone()),
            pet_id: ActiveValue::Set(notification.pet_id.to_string()),
            severity: ActiveValue::Set(notification.severity.as_str().to_string()),
            message: ActiveValue::Set(notification.message.clone()),
            action_hint: ActiveValue::Set(notification.action_hint.clone()),
            created_at: ActiveValue::Set(notification.created_at),
            read_at: ActiveValue::Set(notification.read_at),
        }
    }
}

impl TryFrom<Model> for Notification {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("notification not exists".to_string()))?,
            username: model.username,
            pet_id: Uuid::parse_str(&model.pet_id)
                .map_err(|_| EngineError::KeyNotFound("pet not exists".to_string()))?,
            severity: Severity::try_from(model.severity.as_str())?,
            message: model.message,
            action_hint: model.action_hint,
            created_at: model.created_at,
            read_at: model.read_at,
        })
    }
}
