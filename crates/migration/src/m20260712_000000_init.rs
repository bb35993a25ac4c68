//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for Cuccia:
//!
//! - `users`: staff, admins and tutors referenced as actors and recipients
//! - `pets`: enrolled pets with their credit balance and presence status
//! - `pet_tutors`: which tutors are responsible for a pet
//! - `ledger_entries`: append-only record of every balance change
//! - `attendance_events`: calendar-visible check-in/check-out instants
//! - `activity_notes`: free-text notes attached alongside transitions
//! - `notifications`: balance alerts addressed to tutors and admins

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
}

#[derive(Iden)]
enum Pets {
    Table,
    Id,
    Name,
    Credits,
    Status,
}

#[derive(Iden)]
enum PetTutors {
    Table,
    PetId,
    Username,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    PetId,
    Kind,
    Credits,
    AmountCents,
    Description,
    CreatedBy,
    PaymentRef,
    CreatedAt,
}

#[derive(Iden)]
enum AttendanceEvents {
    Table,
    Id,
    PetId,
    Kind,
    Note,
    CreatedBy,
    OccurredAt,
}

#[derive(Iden)]
enum ActivityNotes {
    Table,
    Id,
    PetId,
    Body,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    Username,
    PetId,
    Severity,
    Message,
    ActionHint,
    CreatedAt,
    ReadAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("tutor"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Pets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Pets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Pets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Pets::Credits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Pets::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Pet Tutors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PetTutors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PetTutors::PetId).string().not_null())
                    .col(ColumnDef::new(PetTutors::Username).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(PetTutors::PetId)
                            .col(PetTutors::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pet_tutors-pet_id")
                            .from(PetTutors::Table, PetTutors::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pet_tutors-username")
                            .from(PetTutors::Table, PetTutors::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pet_tutors-username")
                    .table(PetTutors::Table)
                    .col(PetTutors::Username)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Ledger Entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::PetId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Credits)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::AmountCents).big_integer())
                    .col(
                        ColumnDef::new(LedgerEntries::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::CreatedBy).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::PaymentRef).string())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-pet_id")
                            .from(LedgerEntries::Table, LedgerEntries::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-created_by")
                            .from(LedgerEntries::Table, LedgerEntries::CreatedBy)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-pet_id-created_at")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::PetId)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-created_by")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Attendance Events
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AttendanceEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceEvents::PetId).string().not_null())
                    .col(ColumnDef::new(AttendanceEvents::Kind).string().not_null())
                    .col(ColumnDef::new(AttendanceEvents::Note).string())
                    .col(
                        ColumnDef::new(AttendanceEvents::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance_events-pet_id")
                            .from(AttendanceEvents::Table, AttendanceEvents::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-attendance_events-pet_id-occurred_at")
                    .table(AttendanceEvents::Table)
                    .col(AttendanceEvents::PetId)
                    .col(AttendanceEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Activity Notes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ActivityNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityNotes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityNotes::PetId).string().not_null())
                    .col(ColumnDef::new(ActivityNotes::Body).string().not_null())
                    .col(ColumnDef::new(ActivityNotes::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(ActivityNotes::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activity_notes-pet_id")
                            .from(ActivityNotes::Table, ActivityNotes::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-activity_notes-pet_id")
                    .table(ActivityNotes::Table)
                    .col(ActivityNotes::PetId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Notifications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::Username).string().not_null())
                    .col(ColumnDef::new(Notifications::PetId).string().not_null())
                    .col(ColumnDef::new(Notifications::Severity).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).string().not_null())
                    .col(ColumnDef::new(Notifications::ActionHint).string())
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::ReadAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-username")
                            .from(Notifications::Table, Notifications::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-pet_id")
                            .from(Notifications::Table, Notifications::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notifications-username-read_at")
                    .table(Notifications::Table)
                    .col(Notifications::Username)
                    .col(Notifications::ReadAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse creation order to satisfy FK dependencies.
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActivityNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PetTutors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
