//! Caller identity passed into engine operations.
//!
//! Authorization decisions stay inside the engine's contract: every
//! operation that filters or restricts by caller takes an explicit `Actor`
//! instead of consulting ambient user state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator; sees and manages all bookings
    Admin,
    /// Regular marketplace member
    Member,
}

/// Caller identity and capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User identifier
    pub id: Uuid,

    /// Granted role
    pub role: Role,

    /// Whether the account has completed verification.
    /// Only verified accounts may create bookings.
    pub verified: bool,
}

impl Actor {
    /// Create an admin actor
    pub fn admin(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Admin,
            verified: true,
        }
    }

    /// Create a verified member actor
    pub fn member(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Member,
            verified: true,
        }
    }

    /// Create an unverified member actor
    pub fn unverified(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Member,
            verified: false,
        }
    }

    /// Check whether the actor holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
