//! Per-collection rule sets. Each policy defines up to four predicates;
//! anything left unimplemented falls through to the deny defaults below,
//! so a policy only ever states what it allows.

mod admin_invitations;
mod athletes;
mod audit_logs;
mod content;
mod feature_flags;
mod messages;
mod moderation_alerts;
mod users;

pub use admin_invitations::AdminInvitationsPolicy;
pub use athletes::AthletesPolicy;
pub use audit_logs::AuditLogsPolicy;
pub use content::ContentPolicy;
pub use feature_flags::FeatureFlagsPolicy;
pub use messages::MessagesPolicy;
pub use moderation_alerts::ModerationAlertsPolicy;
pub use users::UsersPolicy;

use super::identity::Identity;
use super::Document;

/// Rule set for one collection. Default bodies deny, which keeps every
/// policy fail-closed for operations it does not mention.
pub trait CollectionPolicy: Send + Sync {
    fn collection(&self) -> &'static str;

    fn can_read(&self, identity: &Identity, document_id: &str, doc: &Document) -> bool {
        let _ = (identity, document_id, doc);
        false
    }

    fn can_create(&self, identity: &Identity, document_id: &str, proposed: &Document) -> bool {
        let _ = (identity, document_id, proposed);
        false
    }

    fn can_update(
        &self,
        identity: &Identity,
        document_id: &str,
        existing: &Document,
        proposed: &Document,
    ) -> bool {
        let _ = (identity, document_id, existing, proposed);
        false
    }

    fn can_delete(&self, identity: &Identity, document_id: &str, doc: &Document) -> bool {
        let _ = (identity, document_id, doc);
        false
    }
}

/// All shipped policies, for engine registration.
pub fn all_policies() -> Vec<Box<dyn CollectionPolicy>> {
    vec![
        Box::new(UsersPolicy),
        Box::new(MessagesPolicy),
        Box::new(AuditLogsPolicy),
        Box::new(FeatureFlagsPolicy),
        Box::new(AdminInvitationsPolicy),
        Box::new(AthletesPolicy),
        Box::new(ModerationAlertsPolicy),
        Box::new(ContentPolicy),
    ]
}
