//! Live activity feed event.

use serde::{Deserialize, Serialize};

/// A cosmetic "someone just bought something" event.
///
/// Broadcast periodically to every connected client. It does not reflect a
/// real purchase and carries no state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Time-derived event ID.
    pub id: String,
    /// Human-readable message, e.g. "Neo just secured a Quantum Core".
    pub message: String,
    /// Wall-clock time the event was generated, formatted for display.
    pub time: String,
}
