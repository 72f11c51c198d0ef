//! Pure, stateless predicates over proposed documents and write deltas.
//! Every function here is evaluated to completion with no I/O so the
//! policies stay unit-testable as ordinary functions.

use std::collections::BTreeSet;

use serde_json::Value;

use super::{fields, Document};

/// Field exists, is a string, and its length is within `[min, max]`.
/// An exactly-empty string fails any `min >= 1` bound; no trimming.
pub fn string_in_range(doc: &Document, field: &str, min: usize, max: usize) -> bool {
    match doc.get(field).and_then(Value::as_str) {
        Some(value) => {
            let len = value.chars().count();
            len >= min && len <= max
        }
        None => false,
    }
}

pub fn str_field<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

/// Keys whose value differs between `existing` and `proposed`, in either
/// direction. Introducing a new field or dropping an old one both count
/// as a change.
pub fn changed_fields(existing: &Document, proposed: &Document) -> BTreeSet<String> {
    let mut changed = BTreeSet::new();
    for (key, value) in existing {
        if proposed.get(key) != Some(value) {
            changed.insert(key.clone());
        }
    }
    for key in proposed.keys() {
        if !existing.contains_key(key) {
            changed.insert(key.clone());
        }
    }
    changed
}

/// Every changed key is a member of `allowed`.
pub fn fields_only_changed(existing: &Document, proposed: &Document, allowed: &[&str]) -> bool {
    changed_fields(existing, proposed)
        .iter()
        .all(|key| allowed.contains(&key.as_str()))
}

/// A specific field is identical between the existing and proposed versions.
pub fn field_unchanged(existing: &Document, proposed: &Document, field: &str) -> bool {
    existing.get(field) == proposed.get(field)
}

/// `participants` is exactly the set {senderId, recipientId}: every listed
/// participant is one of the two, and both appear. Order-insensitive;
/// duplicates collapse.
pub fn participants_exactly(doc: &Document) -> bool {
    let sender = match str_field(doc, fields::SENDER_ID) {
        Some(value) => value,
        None => return false,
    };
    let recipient = match str_field(doc, fields::RECIPIENT_ID) {
        Some(value) => value,
        None => return false,
    };
    let participants = match doc.get(fields::PARTICIPANTS).and_then(Value::as_array) {
        Some(list) => list,
        None => return false,
    };

    if participants.iter().any(|v| !v.is_string()) {
        return false;
    }

    let listed: BTreeSet<&str> = participants.iter().filter_map(Value::as_str).collect();
    let expected: BTreeSet<&str> = [sender, recipient].into_iter().collect();
    listed == expected
}

/// `participants` contains the given id.
pub fn is_participant(doc: &Document, uid: &str) -> bool {
    doc.get(fields::PARTICIPANTS)
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).any(|p| p == uid))
        .unwrap_or(false)
}
