use super::CollectionPolicy;
use crate::authz::identity::{Identity, UPLOAD_ROLES};
use crate::authz::{collections, fields, validators, Document};

pub const STATUS_PUBLISHED: &str = "published";

/// Creator-authored lessons and media. Upload-capable roles create, and
/// only with themselves as `creatorUid`; drafts stay private to the owner
/// and admins until published.
pub struct ContentPolicy;

impl ContentPolicy {
    fn owns(identity: &Identity, doc: &Document) -> bool {
        validators::str_field(doc, fields::CREATOR_UID)
            .map(|creator| identity.is_self(creator))
            .unwrap_or(false)
    }
}

impl CollectionPolicy for ContentPolicy {
    fn collection(&self) -> &'static str {
        collections::CONTENT
    }

    fn can_read(&self, identity: &Identity, _document_id: &str, doc: &Document) -> bool {
        let published = validators::str_field(doc, fields::STATUS) == Some(STATUS_PUBLISHED);
        (published && identity.is_authenticated())
            || Self::owns(identity, doc)
            || identity.is_admin_or_above()
    }

    fn can_create(&self, identity: &Identity, _document_id: &str, proposed: &Document) -> bool {
        identity.has_any_role(&UPLOAD_ROLES) && Self::owns(identity, proposed)
    }

    fn can_update(
        &self,
        identity: &Identity,
        _document_id: &str,
        existing: &Document,
        _proposed: &Document,
    ) -> bool {
        Self::owns(identity, existing) || identity.is_admin_or_above()
    }

    fn can_delete(&self, identity: &Identity, _document_id: &str, doc: &Document) -> bool {
        Self::owns(identity, doc) || identity.is_admin_or_above()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::identity::Role;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn draft() -> Document {
        doc(json!({ "title": "Footwork drills", "creatorUid": "carol", "status": "draft", "sport": "tennis" }))
    }

    #[test]
    fn create_requires_upload_role_and_self_ownership() {
        let carol = Identity::with_role("carol", Some(Role::Coach));
        let athlete = Identity::with_role("amy", Some(Role::Athlete));
        let d = draft();
        assert!(ContentPolicy.can_create(&carol, "c1", &d));
        // Athletes are not upload-capable
        assert!(!ContentPolicy.can_create(&athlete, "c1", &d));
        // Upload role but someone else's creatorUid
        let dave = Identity::with_role("dave", Some(Role::Creator));
        assert!(!ContentPolicy.can_create(&dave, "c1", &d));
    }

    #[test]
    fn drafts_are_private_to_owner_and_admins() {
        let d = draft();
        let owner = Identity::with_role("carol", Some(Role::Coach));
        let admin = Identity::with_role("root", Some(Role::Admin));
        let stranger = Identity::with_role("amy", Some(Role::Athlete));
        assert!(ContentPolicy.can_read(&owner, "c1", &d));
        assert!(ContentPolicy.can_read(&admin, "c1", &d));
        assert!(!ContentPolicy.can_read(&stranger, "c1", &d));
    }

    #[test]
    fn published_content_is_readable_by_any_authenticated_principal() {
        let mut d = draft();
        d.insert("status".into(), json!("published"));
        let stranger = Identity::with_role("amy", Some(Role::Athlete));
        assert!(ContentPolicy.can_read(&stranger, "c1", &d));
        assert!(!ContentPolicy.can_read(&Identity::unauthenticated(), "c1", &d));
    }

    #[test]
    fn update_limited_to_owner_or_admin() {
        let d = draft();
        let mut published = d.clone();
        published.insert("status".into(), json!("published"));

        let owner = Identity::with_role("carol", Some(Role::Coach));
        let other_creator = Identity::with_role("dave", Some(Role::Creator));
        assert!(ContentPolicy.can_update(&owner, "c1", &d, &published));
        assert!(!ContentPolicy.can_update(&other_creator, "c1", &d, &published));
    }
}
