use super::CollectionPolicy;
use crate::authz::guard::MESSAGE_MUTABLE_FIELDS;
use crate::authz::identity::Identity;
use crate::authz::{collections, fields, validators, Document};

pub const CONTENT_MIN_LEN: usize = 1;
pub const CONTENT_MAX_LEN: usize = 2000;

/// Messages: immutable conversational records.
///
/// The sender must be the caller (no impersonation), `participants` is
/// exactly the sender/recipient pair, and content is bounded. The only
/// update ever allowed is the recipient's read receipt; delete stays at
/// its deny default and the immutability guard vetoes it besides, for
/// every role including superadmin.
pub struct MessagesPolicy;

impl CollectionPolicy for MessagesPolicy {
    fn collection(&self) -> &'static str {
        collections::MESSAGES
    }

    fn can_read(&self, identity: &Identity, _document_id: &str, doc: &Document) -> bool {
        let participant = identity
            .uid()
            .map(|uid| validators::is_participant(doc, uid))
            .unwrap_or(false);
        participant || identity.is_admin_or_above()
    }

    fn can_create(&self, identity: &Identity, _document_id: &str, proposed: &Document) -> bool {
        let sender_is_self = validators::str_field(proposed, fields::SENDER_ID)
            .map(|sender| identity.is_self(sender))
            .unwrap_or(false);
        sender_is_self
            && validators::participants_exactly(proposed)
            && validators::string_in_range(proposed, fields::CONTENT, CONTENT_MIN_LEN, CONTENT_MAX_LEN)
    }

    fn can_update(
        &self,
        identity: &Identity,
        _document_id: &str,
        existing: &Document,
        proposed: &Document,
    ) -> bool {
        let recipient = validators::str_field(existing, fields::RECIPIENT_ID)
            .map(|r| identity.is_self(r))
            .unwrap_or(false);
        recipient && validators::fields_only_changed(existing, proposed, &MESSAGE_MUTABLE_FIELDS)
    }

    // can_delete stays at the deny default: nobody deletes messages.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::identity::Role;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn message() -> Document {
        doc(json!({
            "senderId": "alice",
            "recipientId": "bob",
            "participants": ["alice", "bob"],
            "content": "see you at practice",
            "read": false,
        }))
    }

    #[test]
    fn sender_must_be_caller() {
        let alice = Identity::with_role("alice", Some(Role::User));
        let mallory = Identity::with_role("mallory", Some(Role::User));
        let m = message();
        assert!(MessagesPolicy.can_create(&alice, "m1", &m));
        assert!(!MessagesPolicy.can_create(&mallory, "m1", &m));
    }

    #[test]
    fn content_bounds_enforced_at_create() {
        let alice = Identity::with_role("alice", Some(Role::User));
        let mut m = message();
        m.insert("content".into(), json!("x".repeat(2000)));
        assert!(MessagesPolicy.can_create(&alice, "m1", &m));
        m.insert("content".into(), json!("x".repeat(2001)));
        assert!(!MessagesPolicy.can_create(&alice, "m1", &m));
        m.insert("content".into(), json!(""));
        assert!(!MessagesPolicy.can_create(&alice, "m1", &m));
    }

    #[test]
    fn participants_cannot_be_widened() {
        let alice = Identity::with_role("alice", Some(Role::User));
        let mut m = message();
        m.insert("participants".into(), json!(["alice", "bob", "eve"]));
        assert!(!MessagesPolicy.can_create(&alice, "m1", &m));
    }

    #[test]
    fn read_limited_to_participants_and_admins() {
        let m = message();
        let bob = Identity::with_role("bob", Some(Role::User));
        let eve = Identity::with_role("eve", Some(Role::User));
        let admin = Identity::with_role("root", Some(Role::Admin));
        assert!(MessagesPolicy.can_read(&bob, "m1", &m));
        assert!(!MessagesPolicy.can_read(&eve, "m1", &m));
        assert!(MessagesPolicy.can_read(&admin, "m1", &m));
    }

    #[test]
    fn only_recipient_marks_read() {
        let m = message();
        let mut receipt = m.clone();
        receipt.insert("read".into(), json!(true));

        let bob = Identity::with_role("bob", Some(Role::User));
        let alice = Identity::with_role("alice", Some(Role::User));
        assert!(MessagesPolicy.can_update(&bob, "m1", &m, &receipt));
        assert!(!MessagesPolicy.can_update(&alice, "m1", &m, &receipt));
    }

    #[test]
    fn read_receipt_cannot_smuggle_a_content_edit() {
        let m = message();
        let mut tampered = m.clone();
        tampered.insert("read".into(), json!(true));
        tampered.insert("content".into(), json!("rewritten"));

        let bob = Identity::with_role("bob", Some(Role::User));
        assert!(!MessagesPolicy.can_update(&bob, "m1", &m, &tampered));
    }

    #[test]
    fn delete_denied_for_everyone() {
        let m = message();
        for role in [Role::User, Role::Admin, Role::Superadmin] {
            let identity = Identity::with_role("alice", Some(role));
            assert!(!MessagesPolicy.can_delete(&identity, "m1", &m));
        }
    }
}
