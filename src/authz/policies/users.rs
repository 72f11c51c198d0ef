use super::CollectionPolicy;
use crate::authz::identity::Identity;
use crate::authz::{collections, fields, validators, Document};

/// Users collection: one document per principal, keyed by uid.
///
/// Self-service updates may touch anything except `role`; only admins can
/// move a role, and only a superadmin can delete an account. Client-side
/// creation is denied - signup provisioning happens server-side.
pub struct UsersPolicy;

impl CollectionPolicy for UsersPolicy {
    fn collection(&self) -> &'static str {
        collections::USERS
    }

    fn can_read(&self, identity: &Identity, document_id: &str, _doc: &Document) -> bool {
        identity.is_self(document_id) || identity.is_admin_or_above()
    }

    fn can_update(
        &self,
        identity: &Identity,
        document_id: &str,
        existing: &Document,
        proposed: &Document,
    ) -> bool {
        if identity.is_admin_or_above() {
            // Admin branch: role changes included
            return true;
        }
        identity.is_self(document_id)
            && validators::field_unchanged(existing, proposed, fields::ROLE)
    }

    fn can_delete(&self, identity: &Identity, _document_id: &str, _doc: &Document) -> bool {
        identity.is_superadmin()
    }
}
