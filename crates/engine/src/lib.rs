pub use attendance::{AttendanceEvent, AttendanceKind};
pub use commands::{
    AdjustCmd, BonusCmd, CheckInCmd, CheckOutCmd, CreditOpCmd, DebitCmd, EntryMeta, ExpireCmd,
    PurchaseCmd, RefundCmd, RegisterPetCmd,
};
pub use error::EngineError;
pub use ledger::{LedgerEntry, OperationKind};
pub use notifications::{Notification, Severity};
pub use notify::{NotificationSink, NullSink, TableSink};
pub use ops::{
    AlertKind, CheckInEligibility, CheckInOutcome, CheckOutOutcome, CreditOutcome, Engine,
    EngineBuilder, EligibilityAlert, LOW_CREDITS_THRESHOLD,
};
pub use pets::{Pet, PetStatus};
pub use users::UserRole;

mod activity_notes;
mod attendance;
mod commands;
mod error;
mod ledger;
mod notifications;
mod notify;
mod ops;
mod pet_tutors;
mod pets;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
