//! Role-based authorization rules for store management.
//!
//! Every mutating store operation is gated by [`decide`], a pure function
//! over the actor's resolved role and the requested action:
//!
//! - No IO
//! - No panics
//! - No business logic beyond the rule table
//!
//! The caller resolves the actor's role from the membership relation first;
//! an actor with no membership in the store (`None`) is always denied. This
//! keeps the rule table independently testable without a database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role a user holds within a single store.
///
/// Owner and Manager form the privileged tier; Salesperson and Delivery are
/// operational roles with no management rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Owner,
    Manager,
    Salesperson,
    Delivery,
}

impl Role {
    /// Whether this role may manage the store itself and its operational staff.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Owner | Role::Manager)
    }

    /// Database representation of the role.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Manager => "MANAGER",
            Role::Salesperson => "SALESPERSON",
            Role::Delivery => "DELIVERY",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "Owner",
            Role::Manager => "Manager",
            Role::Salesperson => "Salesperson",
            Role::Delivery => "Delivery",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Role::Owner),
            "MANAGER" => Ok(Role::Manager),
            "SALESPERSON" => Ok(Role::Salesperson),
            "DELIVERY" => Ok(Role::Delivery),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A mutating action on a store. Roster changes carry the role of the worker
/// being added or removed, since the required actor role depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    UpdateStore,
    DeleteStore,
    AddWorker(Role),
    RemoveWorker(Role),
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreAction::UpdateStore => write!(f, "update"),
            StoreAction::DeleteStore => write!(f, "delete"),
            StoreAction::AddWorker(role) => write!(f, "add a {role} worker to"),
            StoreAction::RemoveWorker(role) => write!(f, "remove a {role} worker from"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decide whether an actor holding `actor_role` in a store may perform
/// `action` on it.
///
/// The rule table:
///
/// | Action                              | Required actor role |
/// |-------------------------------------|---------------------|
/// | UpdateStore                         | Owner or Manager    |
/// | DeleteStore                         | Owner               |
/// | Add/RemoveWorker(Owner or Manager)  | Owner               |
/// | Add/RemoveWorker(operational tier)  | Owner or Manager    |
pub fn decide(actor_role: Option<Role>, action: StoreAction) -> Decision {
    let Some(actor) = actor_role else {
        return Decision::Deny;
    };

    let allowed = match action {
        StoreAction::UpdateStore => actor.is_privileged(),
        StoreAction::DeleteStore => actor == Role::Owner,
        StoreAction::AddWorker(target) | StoreAction::RemoveWorker(target) => {
            if target.is_privileged() {
                actor == Role::Owner
            } else {
                actor.is_privileged()
            }
        }
    };

    if allowed { Decision::Allow } else { Decision::Deny }
}
