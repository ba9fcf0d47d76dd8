//! Registered identity type.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::IdentityId;

/// A registered identity.
///
/// Created once by registration and never changed afterwards. No password or
/// other credential is attached: logging in is a lookup by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique, time-derived identity ID.
    pub id: IdentityId,
    /// Display name chosen at registration.
    pub name: String,
    /// Email address, unique across identities.
    pub email: Email,
}
