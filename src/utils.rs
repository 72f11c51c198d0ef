use chrono::{DateTime, Utc};
use uuid::Uuid;

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Generated document ids follow the store convention of random ids,
/// comparable to an auto-id from a hosted document database.
pub fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}
