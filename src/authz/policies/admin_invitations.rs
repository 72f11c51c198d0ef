use super::CollectionPolicy;
use crate::authz::identity::Identity;
use crate::authz::{collections, Document};

/// Admin invitations: an admin-only surface whose records double as an
/// audit trail, so delete keeps its deny default (and the immutability
/// guard vetoes it for every role). Status moves over time, hence
/// admin-level update is allowed.
pub struct AdminInvitationsPolicy;

impl CollectionPolicy for AdminInvitationsPolicy {
    fn collection(&self) -> &'static str {
        collections::ADMIN_INVITATIONS
    }

    fn can_read(&self, identity: &Identity, _document_id: &str, _doc: &Document) -> bool {
        identity.is_admin_or_above()
    }

    fn can_create(&self, identity: &Identity, _document_id: &str, _proposed: &Document) -> bool {
        identity.is_admin_or_above()
    }

    fn can_update(
        &self,
        identity: &Identity,
        _document_id: &str,
        _existing: &Document,
        _proposed: &Document,
    ) -> bool {
        identity.is_admin_or_above()
    }
}
