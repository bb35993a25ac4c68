use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Pet, PetStatus, ResultEngine, Severity, pets};

use super::{Engine, credits::LOW_CREDITS_THRESHOLD};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PetNotFound,
    AlreadyCheckedIn,
    NoCredits,
    LowCredits,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PetNotFound => "pet_not_found",
            Self::AlreadyCheckedIn => "already_checked_in",
            Self::NoCredits => "no_credits",
            Self::LowCredits => "low_credits",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub blocking: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInEligibility {
    pub can_check_in: bool,
    pub alerts: Vec<EligibilityAlert>,
}

impl Engine {
    /// Advisory pre-check for a check-in, without mutating anything.
    ///
    /// Purely informational for the calling UI; `check_in` re-validates
    /// balance and state independently, because this result can be stale by
    /// the time the mutating call executes.
    pub async fn validate_check_in(&self, pet_id: Uuid) -> ResultEngine<CheckInEligibility> {
        let mut alerts = Vec::new();

        match pets::Entity::find_by_id(pet_id.to_string())
            .one(&self.database)
            .await?
        {
            None => alerts.push(EligibilityAlert {
                kind: AlertKind::PetNotFound,
                severity: Severity::Error,
                message: "pet not exists".to_string(),
                blocking: true,
            }),
            Some(model) => {
                let pet = Pet::try_from(model)?;
                if pet.status == PetStatus::CheckedIn {
                    alerts.push(EligibilityAlert {
                        kind: AlertKind::AlreadyCheckedIn,
                        severity: Severity::Error,
                        message: format!("{} is already checked in", pet.name),
                        blocking: true,
                    });
                }
                if pet.credits <= 0 {
                    alerts.push(EligibilityAlert {
                        kind: AlertKind::NoCredits,
                        severity: Severity::Error,
                        message: format!("{} has no credits left", pet.name),
                        blocking: true,
                    });
                } else if pet.credits <= LOW_CREDITS_THRESHOLD {
                    alerts.push(EligibilityAlert {
                        kind: AlertKind::LowCredits,
                        severity: Severity::Warning,
                        message: format!(
                            "{} has only {} credit(s) left",
                            pet.name, pet.credits
                        ),
                        blocking: false,
                    });
                }
            }
        }

        let can_check_in = alerts.iter().all(|alert| !alert.blocking);
        Ok(CheckInEligibility {
            can_check_in,
            alerts,
        })
    }
}
