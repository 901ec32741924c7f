//! Users, accounts and control-number prefixes.

use serde::{Deserialize, Serialize};

use super::Role;

/// A person who raises or approves documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub role: Role,
}

/// Identity and role of the caller deciding a step.
///
/// Authentication happens outside the engine; the actor is taken as given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: u64,
    pub role: Role,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// Chart-of-accounts entry referenced by line items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: u64,
    pub code: String,
    pub name: String,
}

/// Configured control-number prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrefixConfig {
    /// Upper-case alphanumeric code, e.g. `DV`
    pub code: String,
    pub description: Option<String>,
    /// Inactive prefixes are kept for existing numbers but cannot issue new ones
    pub active: bool,
}
