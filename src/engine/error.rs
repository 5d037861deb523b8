use chrono::NaiveDate;

use crate::store::StoreError;

/// Failure taxonomy of the booking core. `Display` carries the technical
/// detail for operator logs; [`EngineError::user_message`] is the site-language
/// text shown to customers, which never exposes backend internals.
///
/// An exhausted next-available search is not represented here — it is a
/// legitimate `Ok(None)` outcome, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Required input missing or empty; detected before any store call.
    Validation(&'static str),
    /// Re-validation or insert found the slot already taken.
    Conflict { date: NaiveDate, slot: String },
    /// Backend failure on a read or write, including timeouts.
    Store(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(field) => write!(f, "missing required field: {field}"),
            EngineError::Conflict { date, slot } => {
                write!(f, "slot {slot} on {date} is no longer free")
            }
            EngineError::Store(detail) => write!(f, "store error: {detail}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e.0)
    }
}

impl EngineError {
    /// Customer-facing message, in the site's operating language.
    pub fn user_message(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "Bitte füllen Sie alle Felder aus",
            EngineError::Conflict { .. } => {
                "Dieser Zeitslot ist nicht mehr verfügbar. Bitte wählen Sie eine andere Uhrzeit."
            }
            EngineError::Store(_) => {
                "Ein Fehler ist aufgetreten. Bitte versuchen Sie es erneut."
            }
        }
    }
}
