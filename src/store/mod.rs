//! Guarded in-memory document store.
//!
//! The generic client capability the application pages talk to: named
//! collections of schemaless documents with get/add/create/update/delete/
//! list. Every client operation is intercepted by the rules engine before
//! any mutation is applied; a denial performs zero mutation. A separate
//! system path exists for trusted server-side writes (signup records,
//! athlete provisioning, audit entries, moderation alerts) which are not
//! client operations and bypass the engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::authz::engine::{AccessRequest, Operation, RulesEngine};
use crate::authz::identity::{Identity, Principal};
use crate::authz::{collections, fields, validators, Document, RulesMode};
use crate::errors::{StoreError, StoreResult};
use crate::events::{self, EventBus, SecurityEvent};
use crate::utils::new_document_id;

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Generic document-store client contract the application pages consume.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, principal: &Principal, collection: &str, id: &str) -> StoreResult<Document>;

    /// Create with a generated id; returns the id.
    async fn add(&self, principal: &Principal, collection: &str, doc: Document) -> StoreResult<String>;

    /// Create with a caller-chosen id.
    async fn create(
        &self,
        principal: &Principal,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> StoreResult<()>;

    /// Merge `delta` over the existing document. The engine evaluates the
    /// full post-write document, so a delta cannot sneak past a
    /// field-change allow-list.
    async fn update(
        &self,
        principal: &Principal,
        collection: &str,
        id: &str,
        delta: Document,
    ) -> StoreResult<()>;

    async fn delete(&self, principal: &Principal, collection: &str, id: &str) -> StoreResult<()>;

    /// All documents in a collection the principal may read.
    async fn list(
        &self,
        principal: &Principal,
        collection: &str,
    ) -> StoreResult<Vec<(String, Document)>>;
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
    engine: Arc<RulesEngine>,
    mode: RulesMode,
    events: Option<EventBus>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Strict enforcement, no event bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            engine: Arc::new(RulesEngine::new()),
            mode: RulesMode::Strict,
            events: None,
        }
    }

    /// Enforcement mode from `RULES_MODE` (strict unless overridden).
    pub fn from_env() -> Self {
        Self::new().with_mode(RulesMode::from_env())
    }

    pub fn with_mode(mut self, mode: RulesMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.events = Some(event_bus);
        self
    }

    /// Resolve the caller's identity by reading their own user document
    /// through the trusted path. This read never goes through the users
    /// read policy, so role resolution cannot be denied.
    async fn resolve_identity(&self, principal: &Principal) -> Identity {
        let uid = match &principal.uid {
            Some(uid) => uid.clone(),
            None => return Identity::unauthenticated(),
        };
        let guard = self.inner.read().await;
        let own_doc = guard
            .get(collections::USERS)
            .and_then(|docs| docs.get(&uid));
        Identity::resolve(principal, own_doc)
    }

    /// Evaluate the engine and translate a denial per the enforcement
    /// mode. A denied operation in strict mode performs zero mutation.
    async fn authorize(
        &self,
        principal: &Principal,
        collection: &str,
        operation: Operation,
        document_id: &str,
        existing: Option<&Document>,
        proposed: Option<&Document>,
    ) -> StoreResult<Identity> {
        let identity = self.resolve_identity(principal).await;
        if self.mode == RulesMode::Off {
            return Ok(identity);
        }

        let request = AccessRequest {
            collection,
            operation,
            document_id,
            existing,
            proposed,
        };
        if self.engine.evaluate(&request, &identity).is_allowed() {
            return Ok(identity);
        }

        if let Some(bus) = &self.events {
            events::emit(
                bus,
                SecurityEvent::denied(identity.uid(), collection, operation, document_id),
            );
        }
        match self.mode {
            RulesMode::Advisory => {
                tracing::warn!(
                    collection = %collection,
                    operation = %operation.as_str(),
                    document_id = %document_id,
                    "advisory mode: denied operation allowed through"
                );
                Ok(identity)
            }
            _ => Err(StoreError::permission_denied(format!(
                "{} on {}",
                operation.as_str(),
                collection
            ))),
        }
    }

    fn record_sensitive_write(
        &self,
        identity: &Identity,
        collection: &str,
        operation: Operation,
        document_id: &str,
        existing: Option<&Document>,
        proposed: Option<&Document>,
    ) {
        let Some(bus) = &self.events else { return };
        let sensitive = match collection {
            collections::FEATURE_FLAGS | collections::ADMIN_INVITATIONS => true,
            collections::USERS => match (operation, existing, proposed) {
                (Operation::Delete, _, _) => true,
                (Operation::Update, Some(before), Some(after)) => {
                    !validators::field_unchanged(before, after, fields::ROLE)
                }
                _ => false,
            },
            _ => false,
        };
        if sensitive {
            events::emit(
                bus,
                SecurityEvent::sensitive_write(identity.uid(), collection, operation, document_id),
            );
        }
    }

    async fn existing_doc(&self, collection: &str, id: &str) -> Option<Document> {
        let guard = self.inner.read().await;
        guard.get(collection).and_then(|docs| docs.get(id)).cloned()
    }

    // ----- trusted system path (server-side provisioning) -----

    pub async fn system_create(&self, collection: &str, id: &str, doc: Document) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::conflict(format!("{collection}/{id} already exists")));
        }
        docs.insert(id.to_string(), doc);
        Ok(())
    }

    pub async fn system_add(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let id = new_document_id();
        self.system_create(collection, &id, doc).await?;
        Ok(id)
    }

    pub async fn system_get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        self.existing_doc(collection, id)
            .await
            .ok_or_else(|| StoreError::not_found(format!("{collection}/{id}")))
    }

    pub async fn system_list(&self, collection: &str) -> Vec<(String, Document)> {
        let guard = self.inner.read().await;
        guard
            .get(collection)
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, principal: &Principal, collection: &str, id: &str) -> StoreResult<Document> {
        let doc = self
            .existing_doc(collection, id)
            .await
            .ok_or_else(|| StoreError::not_found(format!("{collection}/{id}")))?;
        self.authorize(principal, collection, Operation::Read, id, Some(&doc), None)
            .await?;
        Ok(doc)
    }

    async fn add(&self, principal: &Principal, collection: &str, doc: Document) -> StoreResult<String> {
        let id = new_document_id();
        self.create(principal, collection, &id, doc).await?;
        Ok(id)
    }

    async fn create(
        &self,
        principal: &Principal,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> StoreResult<()> {
        if self.existing_doc(collection, id).await.is_some() {
            return Err(StoreError::conflict(format!("{collection}/{id} already exists")));
        }
        let identity = self
            .authorize(principal, collection, Operation::Create, id, None, Some(&doc))
            .await?;

        let mut guard = self.inner.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        // Re-check under the write lock; a concurrent create may have won
        if docs.contains_key(id) {
            return Err(StoreError::conflict(format!("{collection}/{id} already exists")));
        }
        docs.insert(id.to_string(), doc.clone());
        drop(guard);

        self.record_sensitive_write(&identity, collection, Operation::Create, id, None, Some(&doc));
        Ok(())
    }

    async fn update(
        &self,
        principal: &Principal,
        collection: &str,
        id: &str,
        delta: Document,
    ) -> StoreResult<()> {
        let existing = self
            .existing_doc(collection, id)
            .await
            .ok_or_else(|| StoreError::not_found(format!("{collection}/{id}")))?;

        let mut proposed = existing.clone();
        for (key, value) in delta {
            proposed.insert(key, value);
        }

        let identity = self
            .authorize(
                principal,
                collection,
                Operation::Update,
                id,
                Some(&existing),
                Some(&proposed),
            )
            .await?;

        let mut guard = self.inner.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        docs.insert(id.to_string(), proposed.clone());
        drop(guard);

        self.record_sensitive_write(
            &identity,
            collection,
            Operation::Update,
            id,
            Some(&existing),
            Some(&proposed),
        );
        Ok(())
    }

    async fn delete(&self, principal: &Principal, collection: &str, id: &str) -> StoreResult<()> {
        let existing = self
            .existing_doc(collection, id)
            .await
            .ok_or_else(|| StoreError::not_found(format!("{collection}/{id}")))?;

        let identity = self
            .authorize(principal, collection, Operation::Delete, id, Some(&existing), None)
            .await?;

        let mut guard = self.inner.write().await;
        if let Some(docs) = guard.get_mut(collection) {
            docs.remove(id);
        }
        drop(guard);

        self.record_sensitive_write(&identity, collection, Operation::Delete, id, Some(&existing), None);
        Ok(())
    }

    async fn list(
        &self,
        principal: &Principal,
        collection: &str,
    ) -> StoreResult<Vec<(String, Document)>> {
        let all = self.system_list(collection).await;
        if self.mode == RulesMode::Off {
            return Ok(all);
        }

        let identity = self.resolve_identity(principal).await;
        let visible = all
            .into_iter()
            .filter(|(id, doc)| {
                let request = AccessRequest {
                    collection,
                    operation: Operation::Read,
                    document_id: id,
                    existing: Some(doc),
                    proposed: None,
                };
                self.engine.evaluate(&request, &identity).is_allowed()
            })
            .collect();
        Ok(visible)
    }
}
