use super::CollectionPolicy;
use crate::authz::identity::Identity;
use crate::authz::{collections, fields, validators, Document};

/// Athlete profiles are provisioned server-side when a coach invite is
/// accepted; clients never create them. Readable by the athlete, the
/// assigned coach, or admins.
pub struct AthletesPolicy;

impl CollectionPolicy for AthletesPolicy {
    fn collection(&self) -> &'static str {
        collections::ATHLETES
    }

    fn can_read(&self, identity: &Identity, _document_id: &str, doc: &Document) -> bool {
        let own = validators::str_field(doc, fields::UID)
            .map(|uid| identity.is_self(uid))
            .unwrap_or(false);
        let assigned_coach = validators::str_field(doc, fields::COACH_ID)
            .map(|coach| identity.is_self(coach))
            .unwrap_or(false);
        own || assigned_coach || identity.is_admin_or_above()
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
        identity.is_superadmin()
    }
}
