//! Cross-cutting audit/immutability guard.
//!
//! Evaluated before any collection policy, and it can only narrow what a
//! policy would grant. The denies here are unconditional: they hold for
//! every role, superadmin included. This is distinct from the
//! role-overridable denies inside the policies and must stay that way.

use super::engine::{AccessRequest, Operation};
use super::{collections, fields, validators};

/// Collections where delete is permanently forbidden (audit trail).
pub const IMMUTABLE_COLLECTIONS: [&str; 4] = [
    collections::MESSAGES,
    collections::AUDIT_LOGS,
    collections::MODERATION_ALERTS,
    collections::ADMIN_INVITATIONS,
];

/// Fields a message recipient may flip after delivery.
pub const MESSAGE_MUTABLE_FIELDS: [&str; 2] = [fields::READ, fields::READ_AT];

/// Returns true when the guard vetoes the operation outright.
pub fn denies(request: &AccessRequest<'_>) -> bool {
    match request.operation {
        Operation::Delete => IMMUTABLE_COLLECTIONS.contains(&request.collection),
        Operation::Update => match request.collection {
            // Audit entries never change once written
            collections::AUDIT_LOGS => true,
            collections::MESSAGES => {
                match (request.existing, request.proposed) {
                    (Some(existing), Some(proposed)) => !validators::fields_only_changed(
                        existing,
                        proposed,
                        &MESSAGE_MUTABLE_FIELDS,
                    ),
                    // Nothing to diff against: fail closed
                    _ => true,
                }
            }
            _ => false,
        },
        Operation::Read | Operation::Create => false,
    }
}
