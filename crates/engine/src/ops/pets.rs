use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    AttendanceEvent, CreditOpCmd, EngineError, EntryMeta, Notification, OperationKind, Pet,
    RegisterPetCmd, ResultEngine, attendance, notifications, pet_tutors, pets,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Enroll a new pet (status `active`).
    ///
    /// A non-zero seed balance goes through the credit engine as a `bonus`
    /// entry, so even the first credits have a ledger record.
    pub async fn register_pet(&self, cmd: RegisterPetCmd) -> ResultEngine<Pet> {
        let name = normalize_required_name(&cmd.name, "pet")?;
        if cmd.starting_credits < 0 {
            return Err(EngineError::InvalidArgument(
                "starting credits must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.actor).await?;
            let pet = Pet::new(name);
            pets::ActiveModel::from(&pet).insert(&db_tx).await?;

            if cmd.starting_credits > 0 {
                self.apply_credit_operation(
                    &db_tx,
                    &CreditOpCmd {
                        pet_id: pet.id,
                        delta: cmd.starting_credits,
                        kind: OperationKind::Bonus,
                        allow_negative: false,
                        meta: EntryMeta::new(cmd.occurred_at).description("Starting balance"),
                        actor: cmd.actor.clone(),
                    },
                )
                .await?;
            }

            let pet = Pet::try_from(self.require_pet(&db_tx, pet.id).await?)?;
            Ok(pet)
        })
    }

    /// Make a tutor responsible for a pet (notification recipient).
    pub async fn assign_tutor(&self, pet_id: Uuid, username: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_pet(&db_tx, pet_id).await?;
            self.require_user(&db_tx, username).await?;

            let existing =
                pet_tutors::Entity::find_by_id((pet_id.to_string(), username.to_string()))
                    .one(&db_tx)
                    .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(username.to_string()));
            }

            pet_tutors::ActiveModel {
                pet_id: ActiveValue::Set(pet_id.to_string()),
                username: ActiveValue::Set(username.to_string()),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Current snapshot of a pet.
    pub async fn pet(&self, pet_id: Uuid) -> ResultEngine<Pet> {
        Pet::try_from(self.require_pet(&self.database, pet_id).await?)
    }

    /// Tutors responsible for a pet.
    pub async fn tutors_of(&self, pet_id: Uuid) -> ResultEngine<Vec<String>> {
        self.require_pet(&self.database, pet_id).await?;
        let rows = pet_tutors::Entity::find()
            .filter(pet_tutors::Column::PetId.eq(pet_id.to_string()))
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(|row| row.username).collect())
    }

    /// Recent attendance events for a pet, newest first (calendar feed).
    pub async fn attendance_events(
        &self,
        pet_id: Uuid,
        limit: u64,
    ) -> ResultEngine<Vec<AttendanceEvent>> {
        self.require_pet(&self.database, pet_id).await?;
        let models = attendance::Entity::find()
            .filter(attendance::Column::PetId.eq(pet_id.to_string()))
            .order_by_desc(attendance::Column::OccurredAt)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(AttendanceEvent::try_from).collect()
    }

    /// Notifications addressed to a user, newest first.
    pub async fn notifications_for(
        &self,
        username: &str,
        unread_only: bool,
        limit: u64,
    ) -> ResultEngine<Vec<Notification>> {
        self.require_user(&self.database, username).await?;
        let mut query = notifications::Entity::find()
            .filter(notifications::Column::Username.eq(username.to_string()))
            .order_by_desc(notifications::Column::CreatedAt)
            .limit(limit);
        if unread_only {
            query = query.filter(notifications::Column::ReadAt.is_null());
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(Notification::try_from).collect()
    }
}
