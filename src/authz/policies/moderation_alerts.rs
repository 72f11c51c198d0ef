use super::CollectionPolicy;
use crate::authz::identity::Identity;
use crate::authz::{collections, Document};

/// Moderation alerts are permanent safety records flagged by the system.
/// Only the read predicate is opened up (to admins); create, update, and
/// delete keep their deny defaults for every role, superadmin included.
pub struct ModerationAlertsPolicy;

impl CollectionPolicy for ModerationAlertsPolicy {
    fn collection(&self) -> &'static str {
        collections::MODERATION_ALERTS
    }

    fn can_read(&self, identity: &Identity, _document_id: &str, _doc: &Document) -> bool {
        identity.is_admin_or_above()
    }
}
