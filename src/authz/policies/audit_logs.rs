use super::CollectionPolicy;
use crate::authz::identity::Identity;
use crate::authz::{collections, Document};

/// Audit logs are written by the trusted server path only. Clients can
/// never create, update, or delete them (those predicates keep their deny
/// defaults, and the immutability guard vetoes update/delete besides);
/// admins may read.
pub struct AuditLogsPolicy;

impl CollectionPolicy for AuditLogsPolicy {
    fn collection(&self) -> &'static str {
        collections::AUDIT_LOGS
    }

    fn can_read(&self, identity: &Identity, _document_id: &str, _doc: &Document) -> bool {
        identity.is_admin_or_above()
    }
}
