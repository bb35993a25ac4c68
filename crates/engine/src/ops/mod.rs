use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::notify::{NotificationSink, TableSink};
use crate::{EngineError, ResultEngine};

mod access;
mod attendance;
mod credits;
mod eligibility;
mod pets;

pub use attendance::{CheckInOutcome, CheckOutOutcome};
pub use credits::{CreditOutcome, LOW_CREDITS_THRESHOLD};
pub use eligibility::{AlertKind, CheckInEligibility, EligibilityAlert};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    sink: Arc<dyn NotificationSink>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the default notification sink (tests, headless tooling).
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> EngineBuilder {
        self.sink = Some(sink);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            sink: self.sink.unwrap_or_else(|| Arc::new(TableSink)),
        })
    }
}
