use sea_orm::{ConnectionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, pets, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_pet(
        &self,
        db: &impl ConnectionTrait,
        pet_id: Uuid,
    ) -> ResultEngine<pets::Model> {
        pets::Entity::find_by_id(pet_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("pet not exists".to_string()))
    }

    pub(super) async fn require_user(
        &self,
        db: &impl ConnectionTrait,
        username: &str,
    ) -> ResultEngine<users::Model> {
        if username.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "actor must not be empty".to_string(),
            ));
        }
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
