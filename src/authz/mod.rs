//! Authorization module - the security rules engine
//!
//! This module implements the declarative per-collection rules engine:
//! - Identity and role resolution from the principal's own user document
//! - Pure field validators over proposed documents and write deltas
//! - One policy per collection (read/create/update/delete predicates)
//! - A dispatcher with fail-closed defaults for unknown collections
//! - An immutability guard that overrides every role, superadmin included
//! - Configurable enforcement modes (strict/advisory/off)

pub mod engine;
pub mod guard;
pub mod identity;
pub mod policies;
pub mod validators;

pub use engine::{AccessRequest, Decision, Operation, RulesEngine};
pub use identity::{Identity, Principal, Role};

use std::sync::OnceLock;

/// Documents are schemaless field maps; the engine never assumes more
/// structure than the fields its predicates inspect.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Rules enforcement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesMode {
    /// No rule checks (local tooling only)
    Off,
    /// Log denials but let operations through (development mode)
    Advisory,
    /// Deny with a permission error (default - rules fail closed)
    Strict,
}

impl RulesMode {
    pub fn from_env() -> Self {
        static MODE: OnceLock<RulesMode> = OnceLock::new();
        *MODE.get_or_init(|| {
            match std::env::var("RULES_MODE").unwrap_or_default().to_lowercase().as_str() {
                "off" => RulesMode::Off,
                "advisory" => RulesMode::Advisory,
                _ => RulesMode::Strict,
            }
        })
    }
}

/// Well-known collection names
pub mod collections {
    pub const USERS: &str = "users";
    pub const MESSAGES: &str = "messages";
    pub const AUDIT_LOGS: &str = "audit_logs";
    pub const FEATURE_FLAGS: &str = "feature_flags";
    pub const ADMIN_INVITATIONS: &str = "admin_invitations";
    pub const ATHLETES: &str = "athletes";
    pub const MODERATION_ALERTS: &str = "moderation_alerts";
    pub const CONTENT: &str = "content";
}

/// Well-known field names inspected by the policies
pub mod fields {
    pub const ROLE: &str = "role";
    pub const SENDER_ID: &str = "senderId";
    pub const RECIPIENT_ID: &str = "recipientId";
    pub const PARTICIPANTS: &str = "participants";
    pub const CONTENT: &str = "content";
    pub const READ: &str = "read";
    pub const READ_AT: &str = "readAt";
    pub const UID: &str = "uid";
    pub const COACH_ID: &str = "coachId";
    pub const CREATOR_UID: &str = "creatorUid";
    pub const STATUS: &str = "status";
}
