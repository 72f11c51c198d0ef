use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::authz::engine::Operation;
use crate::authz::{collections, Document};
use crate::store::MemoryStore;
use crate::utils::utc_now;

/// Severity levels for security events.
/// Controls retention policies and log filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Critical events: long-term retention, never auto-delete
    Critical,
    /// Important events: medium-term retention (default)
    Important,
    /// Noise events: aggressively trimmed (e.g., denied reads)
    Noise,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Noise => "noise",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Important
    }
}

/// A security-relevant decision or write, emitted by the store and
/// projected into the append-only audit log by the listener below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: Uuid,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
    pub actor_uid: Option<String>,
    pub collection: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub severity: Severity,
}

impl SecurityEvent {
    /// A denied client operation. Denied reads are noise; denied writes
    /// are worth keeping around.
    pub fn denied(
        actor_uid: Option<&str>,
        collection: &str,
        operation: Operation,
        document_id: &str,
    ) -> Self {
        let severity = match operation {
            Operation::Read => Severity::Noise,
            _ => Severity::Important,
        };
        Self {
            id: Uuid::new_v4(),
            name: "rules.denied".to_string(),
            occurred_at: utc_now(),
            actor_uid: actor_uid.map(String::from),
            collection: collection.to_string(),
            operation: operation.as_str().to_string(),
            document_id: Some(document_id.to_string()),
            severity,
        }
    }

    /// An allowed write to a sensitive surface (role changes, feature
    /// flags, admin invitations). Event name like "feature_flags.update".
    pub fn sensitive_write(
        actor_uid: Option<&str>,
        collection: &str,
        operation: Operation,
        document_id: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("{}.{}", collection, operation.as_str()),
            occurred_at: utc_now(),
            actor_uid: actor_uid.map(String::from),
            collection: collection.to_string(),
            operation: operation.as_str().to_string(),
            document_id: Some(document_id.to_string()),
            severity: Severity::Critical,
        }
    }
}

pub type EventBus = broadcast::Sender<Value>;

pub fn init_event_bus() -> (EventBus, broadcast::Receiver<Value>) {
    broadcast::channel(1024)
}

/// Fire and forget - event delivery failures must not break the store path.
pub fn emit(event_bus: &EventBus, event: SecurityEvent) {
    let _ = event_bus.send(serde_json::to_value(event).unwrap_or_default());
}

/// Consumes security events and appends them to the `audit_logs`
/// collection through the trusted system path, chaining each entry to the
/// previous one with SHA256(prev_hash || payload).
pub async fn start_audit_listener(mut rx: broadcast::Receiver<Value>, store: MemoryStore) {
    use sha2::{Digest, Sha256};

    tracing::info!("audit listener started");
    let mut prev_hash: Option<String> = None;

    while let Ok(event) = rx.recv().await {
        let name = event
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let actor = event.get("actor_uid").and_then(|v| v.as_str()).map(String::from);
        let occurred_at = event
            .get("occurred_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(utc_now);
        let severity = event
            .get("severity")
            .and_then(|v| v.as_str())
            .unwrap_or(Severity::default().as_str())
            .to_string();

        let payload_str = serde_json::to_string(&event).unwrap_or_default();
        let mut hasher = Sha256::new();
        if let Some(ref ph) = prev_hash {
            hasher.update(ph.as_bytes());
        }
        hasher.update(payload_str.as_bytes());
        let hash = hex::encode(hasher.finalize());

        let mut entry = Document::new();
        entry.insert("eventType".to_string(), Value::String(name));
        entry.insert(
            "userId".to_string(),
            actor.map(Value::String).unwrap_or(Value::Null),
        );
        entry.insert(
            "timestamp".to_string(),
            Value::String(occurred_at.to_rfc3339()),
        );
        entry.insert("severity".to_string(), Value::String(severity));
        entry.insert("payload".to_string(), event);
        entry.insert(
            "prevHash".to_string(),
            prev_hash.clone().map(Value::String).unwrap_or(Value::Null),
        );
        entry.insert("hash".to_string(), Value::String(hash.clone()));

        if let Err(err) = store.system_add(collections::AUDIT_LOGS, entry).await {
            tracing::error!("failed to append audit entry: {err}");
        }
        prev_hash = Some(hash);
    }
}
