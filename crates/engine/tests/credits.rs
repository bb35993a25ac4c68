use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    AdjustCmd, BonusCmd, CreditOpCmd, DebitCmd, Engine, EngineError, EntryMeta, ExpireCmd,
    NullSink, OperationKind, PetStatus, PurchaseCmd, RefundCmd, RegisterPetCmd, Severity,
};
use migration::MigratorTrait;

async fn seed_users(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    for (username, role) in [
        ("carla", "staff"),
        ("alice", "tutor"),
        ("bob", "tutor"),
        ("dana", "admin"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), role.into()],
        ))
        .await
        .unwrap();
    }
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_users(&db).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_users(&db).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, url, path)
}

async fn register_pet(engine: &Engine, credits: i64) -> Uuid {
    let pet = engine
        .register_pet(RegisterPetCmd::new("Fido", "carla", Utc::now()).starting_credits(credits))
        .await
        .unwrap();
    pet.id
}

#[tokio::test]
async fn purchase_raises_balance_without_notifications() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 4).await;
    engine.assign_tutor(pet_id, "alice").await.unwrap();

    let outcome = engine
        .add_credits(PurchaseCmd::new(pet_id, "carla", 10, Utc::now()))
        .await
        .unwrap();

    assert_eq!(outcome.previous_balance, 4);
    assert_eq!(outcome.new_balance, 14);
    assert_eq!(engine.credits_balance(pet_id).await.unwrap(), 14);

    let entries = engine.ledger_entries(pet_id, 10).await.unwrap();
    assert_eq!(entries[0].kind, OperationKind::Purchase);
    assert_eq!(entries[0].credits, 10);
    assert_eq!(entries[0].id, outcome.entry_id);

    // The balance rose; no threshold was crossed downward.
    let alerts = engine.notifications_for("alice", false, 50).await.unwrap();
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn purchase_records_payment_metadata() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 0).await;

    let cmd = PurchaseCmd::new(pet_id, "carla", 10, Utc::now()).meta(
        EntryMeta::new(Utc::now())
            .description("10-day pack")
            .amount_cents(15_000)
            .payment_ref("pay_0042"),
    );
    engine.add_credits(cmd).await.unwrap();

    let entries = engine.ledger_entries(pet_id, 1).await.unwrap();
    assert_eq!(entries[0].description, "10-day pack");
    assert_eq!(entries[0].amount_cents, Some(15_000));
    assert_eq!(entries[0].payment_ref, Some("pay_0042".to_string()));
    assert_eq!(entries[0].created_by, "carla");
}

#[tokio::test]
async fn refund_bonus_and_expiration_keep_the_ledger_explicit() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 5).await;

    engine
        .refund_credits(RefundCmd::new(pet_id, "carla", 2, Utc::now()))
        .await
        .unwrap();
    engine
        .add_bonus_credits(BonusCmd::new(pet_id, "carla", 1, Utc::now()))
        .await
        .unwrap();
    let outcome = engine
        .expire_credits(ExpireCmd::new(pet_id, "carla", 4, Utc::now()))
        .await
        .unwrap();

    assert_eq!(outcome.new_balance, 4);
    assert_eq!(engine.credits_balance(pet_id).await.unwrap(), 4);

    let kinds: Vec<_> = engine
        .ledger_entries(pet_id, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.kind)
        .collect();
    assert!(kinds.contains(&OperationKind::Refund));
    assert!(kinds.contains(&OperationKind::Bonus));
    assert!(kinds.contains(&OperationKind::Expiration));
}

#[tokio::test]
async fn ledger_magnitude_matches_balance_change() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 0).await;

    let outcome = engine
        .add_credits(PurchaseCmd::new(pet_id, "carla", 7, Utc::now()))
        .await
        .unwrap();
    let entries = engine.ledger_entries(pet_id, 1).await.unwrap();
    assert_eq!(
        entries[0].credits,
        (outcome.new_balance - outcome.previous_balance).abs()
    );

    let outcome = engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            2,
            OperationKind::Checkout,
            Utc::now(),
        ))
        .await
        .unwrap();
    let entries = engine.ledger_entries(pet_id, 1).await.unwrap();
    assert_eq!(
        entries[0].credits,
        (outcome.new_balance - outcome.previous_balance).abs()
    );
}

#[tokio::test]
async fn debit_below_zero_fails_without_mutation() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 1).await;

    let err = engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            2,
            OperationKind::Checkin,
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::InsufficientCredits("Fido".to_string()));
    assert_eq!(engine.credits_balance(pet_id).await.unwrap(), 1);
    // Only the starting-balance entry exists.
    assert_eq!(engine.ledger_entries(pet_id, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn debit_rejects_non_attendance_kinds() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 5).await;

    let err = engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            1,
            OperationKind::Purchase,
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn zero_amounts_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 5).await;

    let err = engine
        .add_credits(PurchaseCmd::new(pet_id, "carla", 0, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidArgument("credits must be > 0".to_string())
    );

    let err = engine
        .adjust_credits(AdjustCmd::new(pet_id, "carla", 0, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidArgument("delta must not be 0".to_string())
    );
}

#[tokio::test]
async fn adjustment_needs_explicit_authorization_to_go_negative() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 1).await;

    let err = engine
        .adjust_credits(AdjustCmd::new(pet_id, "dana", -3, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientCredits("Fido".to_string()));
    assert_eq!(engine.credits_balance(pet_id).await.unwrap(), 1);

    let outcome = engine
        .adjust_credits(
            AdjustCmd::new(pet_id, "dana", -3, Utc::now())
                .allow_negative()
                .description("billing correction"),
        )
        .await
        .unwrap();
    assert_eq!(outcome.new_balance, -2);
    assert_eq!(engine.credits_balance(pet_id).await.unwrap(), -2);

    let entries = engine.ledger_entries(pet_id, 1).await.unwrap();
    assert_eq!(entries[0].kind, OperationKind::Adjustment);
    assert_eq!(entries[0].credits, 3);
    assert_eq!(entries[0].description, "billing correction");
}

#[tokio::test]
async fn low_balance_crossing_notifies_each_tutor_once() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 4).await;
    engine.assign_tutor(pet_id, "alice").await.unwrap();
    engine.assign_tutor(pet_id, "bob").await.unwrap();

    // 4 -> 3 crosses the threshold.
    engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            1,
            OperationKind::Checkin,
            Utc::now(),
        ))
        .await
        .unwrap();

    for tutor in ["alice", "bob"] {
        let alerts = engine.notifications_for(tutor, false, 50).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].pet_id, pet_id);
        assert_eq!(alerts[0].action_hint, Some("buy_credits".to_string()));
    }

    // 3 -> 2 stays inside the band: no second alert.
    engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            1,
            OperationKind::Checkin,
            Utc::now(),
        ))
        .await
        .unwrap();

    for tutor in ["alice", "bob"] {
        let alerts = engine.notifications_for(tutor, false, 50).await.unwrap();
        assert_eq!(alerts.len(), 1);
    }
}

#[tokio::test]
async fn depletion_notifies_tutors_and_admins() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 1).await;
    engine.assign_tutor(pet_id, "alice").await.unwrap();

    // 1 -> 0 is a depletion, not a low-balance crossing.
    engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            1,
            OperationKind::Checkin,
            Utc::now(),
        ))
        .await
        .unwrap();

    let alerts = engine.notifications_for("alice", false, 50).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, Severity::Error);

    let alerts = engine.notifications_for("dana", false, 50).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, Severity::Error);

    // Tutors not assigned to this pet hear nothing.
    let alerts = engine.notifications_for("bob", false, 50).await.unwrap();
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn null_sink_suppresses_notifications() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_users(&db).await;
    let engine = Engine::builder()
        .database(db.clone())
        .sink(std::sync::Arc::new(NullSink))
        .build()
        .await
        .unwrap();

    let pet_id = register_pet(&engine, 1).await;
    engine.assign_tutor(pet_id, "alice").await.unwrap();
    engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            1,
            OperationKind::Checkin,
            Utc::now(),
        ))
        .await
        .unwrap();

    let alerts = engine.notifications_for("alice", false, 50).await.unwrap();
    assert!(alerts.is_empty());
}

/// Sink that always fails, to prove alert emission never fails the caller.
struct FailingSink;

#[async_trait::async_trait]
impl engine::NotificationSink for FailingSink {
    async fn notify_low_balance(
        &self,
        _db: &sea_orm::DatabaseTransaction,
        _pet: &engine::Pet,
        _new_balance: i64,
        _at: chrono::DateTime<Utc>,
    ) -> Result<(), EngineError> {
        Err(EngineError::Database(sea_orm::DbErr::Custom(
            "sink down".to_string(),
        )))
    }

    async fn notify_depleted(
        &self,
        _db: &sea_orm::DatabaseTransaction,
        _pet: &engine::Pet,
        _at: chrono::DateTime<Utc>,
    ) -> Result<(), EngineError> {
        Err(EngineError::Database(sea_orm::DbErr::Custom(
            "sink down".to_string(),
        )))
    }
}

#[tokio::test]
async fn sink_failures_never_fail_the_operation() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_users(&db).await;
    let engine = Engine::builder()
        .database(db.clone())
        .sink(std::sync::Arc::new(FailingSink))
        .build()
        .await
        .unwrap();

    let pet_id = register_pet(&engine, 1).await;
    engine.assign_tutor(pet_id, "alice").await.unwrap();

    // 1 -> 0 would emit a depletion alert; the sink error is absorbed.
    let outcome = engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            1,
            OperationKind::Checkin,
            Utc::now(),
        ))
        .await
        .unwrap();

    assert_eq!(outcome.new_balance, 0);
    assert_eq!(engine.credits_balance(pet_id).await.unwrap(), 0);
    // The balance change and its ledger entry still committed.
    assert_eq!(engine.ledger_entries(pet_id, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unread_filter_hides_read_notifications() {
    let (engine, db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 1).await;
    engine.assign_tutor(pet_id, "alice").await.unwrap();
    engine
        .debit_credits(DebitCmd::new(
            pet_id,
            "carla",
            1,
            OperationKind::Checkin,
            Utc::now(),
        ))
        .await
        .unwrap();

    assert_eq!(
        engine.notifications_for("alice", true, 50).await.unwrap().len(),
        1
    );

    // The inbox collaborator owns the read lifecycle; emulate it directly.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE notifications SET read_at = ? WHERE username = ?",
        vec![Utc::now().into(), "alice".into()],
    ))
    .await
    .unwrap();

    assert!(engine
        .notifications_for("alice", true, 50)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        engine.notifications_for("alice", false, 50).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn missing_pet_and_actor_are_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .add_credits(PurchaseCmd::new(Uuid::new_v4(), "carla", 5, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("pet not exists".to_string()));

    let pet_id = register_pet(&engine, 0).await;
    let err = engine
        .add_credits(PurchaseCmd::new(pet_id, "nobody", 5, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));

    let err = engine
        .add_credits(PurchaseCmd::new(pet_id, "  ", 5, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidArgument("actor must not be empty".to_string())
    );
}

#[tokio::test]
async fn general_credit_operation_is_exposed_directly() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 0).await;

    let outcome = engine
        .perform_credit_operation(CreditOpCmd::new(
            pet_id,
            "carla",
            5,
            OperationKind::Purchase,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(outcome.previous_balance, 0);
    assert_eq!(outcome.new_balance, 5);

    // The negative-balance override is tied to the adjustment kind.
    let mut cmd = CreditOpCmd::new(pet_id, "carla", -1, OperationKind::Purchase, Utc::now());
    cmd.allow_negative = true;
    let err = engine.perform_credit_operation(cmd).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidArgument("allow_negative is only valid for adjustments".to_string())
    );
}

#[tokio::test]
async fn has_credits_compares_against_requirement() {
    let (engine, _db) = engine_with_db().await;
    let pet_id = register_pet(&engine, 2).await;

    assert!(engine.has_credits(pet_id, 1).await.unwrap());
    assert!(engine.has_credits(pet_id, 2).await.unwrap());
    assert!(!engine.has_credits(pet_id, 3).await.unwrap());
}

#[tokio::test]
async fn restart_engine_reads_same_state() {
    let (engine, db, url, path) = engine_with_file_db().await;
    let pet_id = register_pet(&engine, 0).await;
    engine
        .add_credits(PurchaseCmd::new(pet_id, "carla", 10, Utc::now()))
        .await
        .unwrap();

    drop(engine);
    drop(db);

    let db2 = Database::connect(&url).await.unwrap();
    let engine2 = Engine::builder()
        .database(db2.clone())
        .build()
        .await
        .unwrap();

    assert_eq!(engine2.credits_balance(pet_id).await.unwrap(), 10);
    let pet = engine2.pet(pet_id).await.unwrap();
    assert_eq!(pet.status, PetStatus::Active);

    drop(db2);
    let _ = std::fs::remove_file(path);
}
