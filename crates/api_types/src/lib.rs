use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of an alert or notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

pub mod pet {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PetStatus {
        Active,
        CheckedIn,
    }

    /// Request body for enrolling a pet.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PetRegister {
        pub name: String,
        pub starting_credits: Option<i64>,
    }

    /// Request body for assigning a tutor.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TutorAssign {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TutorListResponse {
        pub tutors: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PetView {
        pub id: Uuid,
        pub name: String,
        pub credits: i64,
        pub status: PetStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub pet_id: Uuid,
        pub credits: i64,
    }
}

pub mod credits {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OperationKind {
        Purchase,
        Checkin,
        Checkout,
        Refund,
        Adjustment,
        Bonus,
        Expiration,
    }

    /// Request body for the fixed-kind credit mutations
    /// (purchase/refund/bonus/expiration).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditMutation {
        pub pet_id: Uuid,
        pub credits: i64,
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        pub payment_ref: Option<String>,
    }

    /// Request body for an administrative adjustment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditAdjust {
        pub pet_id: Uuid,
        pub delta: i64,
        /// Explicit authorization for a negative resulting balance.
        pub allow_negative: Option<bool>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditResult {
        pub previous_balance: i64,
        pub new_balance: i64,
        pub entry_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub kind: OperationKind,
        pub credits: i64,
        pub amount_cents: Option<i64>,
        pub description: String,
        pub created_by: String,
        pub payment_ref: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerListResponse {
        pub entries: Vec<LedgerEntryView>,
    }
}

pub mod attendance {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AttendanceKind {
        Checkin,
        Checkout,
    }

    /// Request body for a check-in.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckIn {
        pub pet_id: Uuid,
        pub bypass_reason: Option<String>,
        pub notes: Option<String>,
    }

    /// Request body for a check-out.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckOut {
        pub pet_id: Uuid,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckInResult {
        pub pet: super::pet::PetView,
        pub event_id: Uuid,
        pub ledger_entry_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckOutResult {
        pub pet: super::pet::PetView,
        pub event_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttendanceEventView {
        pub id: Uuid,
        pub kind: AttendanceKind,
        pub note: Option<String>,
        pub created_by: String,
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttendanceListResponse {
        pub events: Vec<AttendanceEventView>,
    }
}

pub mod eligibility {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AlertKind {
        PetNotFound,
        AlreadyCheckedIn,
        NoCredits,
        LowCredits,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Alert {
        pub kind: AlertKind,
        pub severity: Severity,
        pub message: String,
        pub blocking: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EligibilityResponse {
        pub can_check_in: bool,
        pub alerts: Vec<Alert>,
    }
}

pub mod notification {
    use super::*;

    /// Query parameters for listing a user's notifications.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationList {
        pub unread_only: Option<bool>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub pet_id: Uuid,
        pub severity: Severity,
        pub message: String,
        pub action_hint: Option<String>,
        pub created_at: DateTime<FixedOffset>,
        pub read: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationListResponse {
        pub notifications: Vec<NotificationView>,
    }
}
