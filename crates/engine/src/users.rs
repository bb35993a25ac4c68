//! Users table (minimal entity).
//!
//! The engine references users by `username` for actors and notification
//! recipients. Authentication itself lives with the host.

use sea_orm::entity::prelude::*;

use crate::EngineError;

/// Role of a user towards the daycare.
///
/// - `tutor`: responsible for one or more pets, receives balance alerts.
/// - `staff`: performs check-ins and credit operations.
/// - `admin`: staff plus depletion alerts and balance adjustments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserRole {
    Tutor,
    Staff,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tutor => "tutor",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    pub fn can_manage_credits(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl TryFrom<&str> for UserRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "tutor" => Ok(Self::Tutor),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid user role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
