use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{fields, Document};

/// Role ladder for the marketplace. Ordering matters only to humans;
/// the policies always check explicit role sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Athlete,
    Coach,
    Creator,
    Assistant,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Athlete => "athlete",
            Role::Coach => "coach",
            Role::Creator => "creator",
            Role::Assistant => "assistant",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "athlete" => Some(Role::Athlete),
            "coach" => Some(Role::Coach),
            "creator" => Some(Role::Creator),
            "assistant" => Some(Role::Assistant),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Roles allowed to publish content (lessons, media)
pub const UPLOAD_ROLES: [Role; 5] = [
    Role::Creator,
    Role::Coach,
    Role::Assistant,
    Role::Admin,
    Role::Superadmin,
];

/// Principal represents the caller as presented by the authentication
/// provider: an id when a session exists, nothing otherwise.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub uid: Option<String>,
}

impl Principal {
    pub fn authenticated(uid: impl Into<String>) -> Self {
        Self { uid: Some(uid.into()) }
    }

    pub fn anonymous() -> Self {
        Self { uid: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.uid.is_some()
    }
}

/// Identity is the principal plus the role resolved from that principal's
/// own user document. Every policy predicate composes these checks.
///
/// Failure semantics: unauthenticated principals satisfy no predicate at
/// all; a principal whose user document is missing keeps a working
/// `is_self` (it compares ids, not roles) but satisfies no role check.
#[derive(Debug, Clone)]
pub struct Identity {
    uid: Option<String>,
    role: Option<Role>,
}

impl Identity {
    pub fn unauthenticated() -> Self {
        Self { uid: None, role: None }
    }

    /// Build an identity from the principal and their own user document.
    /// The store fetches that document through its trusted internal path so
    /// that role resolution can never be denied by the users read policy.
    pub fn resolve(principal: &Principal, own_user_doc: Option<&Document>) -> Self {
        let uid = match &principal.uid {
            Some(uid) => uid.clone(),
            None => return Self::unauthenticated(),
        };
        let role = own_user_doc
            .and_then(|doc| doc.get(fields::ROLE))
            .and_then(Value::as_str)
            .and_then(Role::parse);
        Self { uid: Some(uid), role }
    }

    /// Identity with an explicitly supplied role; used by the CLI simulator
    /// and unit tests where no store is in play.
    pub fn with_role(uid: impl Into<String>, role: Option<Role>) -> Self {
        Self { uid: Some(uid.into()), role }
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn current_role(&self) -> Option<Role> {
        if self.is_authenticated() {
            self.role
        } else {
            None
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.uid.is_some()
    }

    pub fn is_self(&self, target_id: &str) -> bool {
        self.uid.as_deref() == Some(target_id)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        match self.current_role() {
            Some(role) => roles.contains(&role),
            None => false,
        }
    }

    pub fn is_admin_or_above(&self) -> bool {
        self.has_any_role(&[Role::Admin, Role::Superadmin])
    }

    pub fn is_superadmin(&self) -> bool {
        self.current_role() == Some(Role::Superadmin)
    }
}
