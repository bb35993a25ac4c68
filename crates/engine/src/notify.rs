//! Notification emission.
//!
//! The engine depends on a [`NotificationSink`] capability injected at
//! construction, so the ledger logic never knows how alerts are materialized
//! and tests can substitute a recording stub. The default [`TableSink`]
//! writes one `notifications` row per recipient on the caller's transaction.
//!
//! Emission is best-effort: the engine logs and absorbs sink errors instead
//! of failing the parent operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{
    Notification, Pet, ResultEngine, Severity, UserRole, notifications, pet_tutors, users,
};

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// The balance crossed into the low band (`0 < new_balance <= threshold`).
    async fn notify_low_balance(
        &self,
        db: &DatabaseTransaction,
        pet: &Pet,
        new_balance: i64,
        at: DateTime<Utc>,
    ) -> ResultEngine<()>;

    /// The balance reached zero.
    async fn notify_depleted(
        &self,
        db: &DatabaseTransaction,
        pet: &Pet,
        at: DateTime<Utc>,
    ) -> ResultEngine<()>;
}

/// Default sink: resolves the pet's tutors (and, for depletion, every
/// administrator) and creates one notification row per recipient.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableSink;

impl TableSink {
    async fn tutors_of(&self, db: &DatabaseTransaction, pet: &Pet) -> ResultEngine<Vec<String>> {
        let rows = pet_tutors::Entity::find()
            .filter(pet_tutors::Column::PetId.eq(pet.id.to_string()))
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|row| row.username).collect())
    }

    async fn admins(&self, db: &DatabaseTransaction) -> ResultEngine<Vec<String>> {
        let rows = users::Entity::find()
            .filter(users::Column::Role.eq(UserRole::Admin.as_str()))
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|row| row.username).collect())
    }

    async fn insert_for(
        &self,
        db: &DatabaseTransaction,
        recipients: &[String],
        pet: &Pet,
        severity: Severity,
        message: &str,
        action_hint: &str,
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        for username in recipients {
            let notification = Notification::new(
                username.clone(),
                pet.id,
                severity,
                message.to_string(),
                Some(action_hint.to_string()),
                at,
            );
            notifications::ActiveModel::from(&notification).insert(db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TableSink {
    async fn notify_low_balance(
        &self,
        db: &DatabaseTransaction,
        pet: &Pet,
        new_balance: i64,
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let tutors = self.tutors_of(db, pet).await?;
        let message = format!("{} has only {} credit(s) left", pet.name, new_balance);
        self.insert_for(db, &tutors, pet, Severity::Warning, &message, "buy_credits", at)
            .await
    }

    async fn notify_depleted(
        &self,
        db: &DatabaseTransaction,
        pet: &Pet,
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let mut recipients = self.tutors_of(db, pet).await?;
        for admin in self.admins(db).await? {
            if !recipients.contains(&admin) {
                recipients.push(admin);
            }
        }
        let message = format!("{} has run out of credits", pet.name);
        self.insert_for(db, &recipients, pet, Severity::Error, &message, "buy_credits", at)
            .await
    }
}

/// Sink that drops every notification (headless tooling, tests).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn notify_low_balance(
        &self,
        _db: &DatabaseTransaction,
        _pet: &Pet,
        _new_balance: i64,
        _at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        Ok(())
    }

    async fn notify_depleted(
        &self,
        _db: &DatabaseTransaction,
        _pet: &Pet,
        _at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        Ok(())
    }
}
