use serde::{Deserialize, Serialize};

use crate::EventSource;

// Declare all domain modules
pub mod general;
pub mod guard;

// Re-export all domain events
pub use general::*;
pub use guard::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings and debug messages not tied to a domain
    General(GeneralEvent),

    /// Model verification events
    Guard(GuardEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Guard(_) => EventSource::GUARD,
        }
    }
}
