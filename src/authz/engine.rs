use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::guard;
use super::identity::Identity;
use super::policies::{self, CollectionPolicy};
use super::Document;

/// Document-store operation types the engine intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Operation::Read),
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(format!("unknown operation: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// One intercepted store operation. The existing and proposed documents
/// are explicit parameters rather than ambient state so decisions stay
/// pure functions of their inputs.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub collection: &'a str,
    pub operation: Operation,
    pub document_id: &'a str,
    pub existing: Option<&'a Document>,
    pub proposed: Option<&'a Document>,
}

/// Routes each operation to its collection policy.
///
/// Evaluation order:
/// 1. immutability guard veto -> deny (overrides every role)
/// 2. registered collection policy predicate
/// 3. unknown collection or missing document context -> deny
pub struct RulesEngine {
    policies: HashMap<&'static str, Box<dyn CollectionPolicy>>,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine {
    pub fn new() -> Self {
        let mut map: HashMap<&'static str, Box<dyn CollectionPolicy>> = HashMap::new();
        for policy in policies::all_policies() {
            map.insert(policy.collection(), policy);
        }
        Self { policies: map }
    }

    pub fn collections(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.policies.keys().copied()
    }

    pub fn evaluate(&self, request: &AccessRequest<'_>, identity: &Identity) -> Decision {
        if guard::denies(request) {
            tracing::debug!(
                collection = %request.collection,
                operation = %request.operation.as_str(),
                "immutability guard veto"
            );
            return Decision::Deny;
        }

        let policy = match self.policies.get(request.collection) {
            Some(policy) => policy,
            None => {
                // Fail closed: collections without a policy deny everything
                tracing::debug!(collection = %request.collection, "no policy registered, deny");
                return Decision::Deny;
            }
        };

        let allowed = match request.operation {
            Operation::Read => match request.existing {
                Some(doc) => policy.can_read(identity, request.document_id, doc),
                None => false,
            },
            Operation::Create => match request.proposed {
                Some(proposed) => policy.can_create(identity, request.document_id, proposed),
                None => false,
            },
            Operation::Update => match (request.existing, request.proposed) {
                (Some(existing), Some(proposed)) => {
                    policy.can_update(identity, request.document_id, existing, proposed)
                }
                _ => false,
            },
            Operation::Delete => match request.existing {
                Some(doc) => policy.can_delete(identity, request.document_id, doc),
                None => false,
            },
        };

        tracing::debug!(
            collection = %request.collection,
            operation = %request.operation.as_str(),
            document_id = %request.document_id,
            uid = %identity.uid().unwrap_or("<anonymous>"),
            allowed,
            "rule evaluated"
        );
        Decision::from_bool(allowed)
    }
}
