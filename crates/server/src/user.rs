//! Users table (server-side auth entity) and role gates.

use engine::UserRole;
use sea_orm::entity::prelude::*;

use crate::ServerError;

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

impl Model {
    pub fn role(&self) -> Result<UserRole, ServerError> {
        UserRole::try_from(self.role.as_str()).map_err(ServerError::Engine)
    }
}

/// Staff and admins may run credit operations and attendance transitions.
pub fn require_credit_manager(user: &Model) -> Result<(), ServerError> {
    if user.role()?.can_manage_credits() {
        Ok(())
    } else {
        Err(ServerError::Forbidden)
    }
}

/// Admin-only gates: adjustments and check-in bypasses.
pub fn require_admin(user: &Model) -> Result<(), ServerError> {
    if user.role()? == UserRole::Admin {
        Ok(())
    } else {
        Err(ServerError::Forbidden)
    }
}
