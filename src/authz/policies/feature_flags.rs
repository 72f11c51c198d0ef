use super::CollectionPolicy;
use crate::authz::identity::Identity;
use crate::authz::{collections, Document};

/// Feature flags: broadly readable, admin-writable toggles.
pub struct FeatureFlagsPolicy;

impl CollectionPolicy for FeatureFlagsPolicy {
    fn collection(&self) -> &'static str {
        collections::FEATURE_FLAGS
    }

    fn can_read(&self, identity: &Identity, _document_id: &str, _doc: &Document) -> bool {
        identity.is_authenticated()
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

    fn can_delete(&self, identity: &Identity, _document_id: &str, _doc: &Document) -> bool {
        identity.is_admin_or_above()
    }
}
