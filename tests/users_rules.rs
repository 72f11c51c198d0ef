use anyhow::Result;
use serde_json::json;

use courtside_rules::authz::collections;
use courtside_rules::{Document, DocumentStore, MemoryStore, Principal, StoreError};

fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap()
}

async fn seed_user(store: &MemoryStore, uid: &str, role: &str) -> Result<()> {
    store
        .system_create(
            collections::USERS,
            uid,
            doc(json!({
                "role": role,
                "email": format!("{uid}@example.com"),
                "displayName": uid,
            })),
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn users_can_read_and_rename_themselves() -> Result<()> {
    let store = MemoryStore::new();
    seed_user(&store, "alice", "user").await?;

    let alice = Principal::authenticated("alice");
    let own = store.get(&alice, collections::USERS, "alice").await?;
    assert_eq!(own.get("role"), Some(&json!("user")));

    store
        .update(&alice, collections::USERS, "alice", doc(json!({ "displayName": "Alice W." })))
        .await?;
    let after = store.get(&alice, collections::USERS, "alice").await?;
    assert_eq!(after.get("displayName"), Some(&json!("Alice W.")));
    Ok(())
}

#[tokio::test]
async fn a_user_cannot_read_another_users_record() -> Result<()> {
    let store = MemoryStore::new();
    seed_user(&store, "alice", "user").await?;
    seed_user(&store, "bob", "user").await?;

    let alice = Principal::authenticated("alice");
    let err = store.get(&alice, collections::USERS, "bob").await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    Ok(())
}

#[tokio::test]
async fn self_role_escalation_is_denied() -> Result<()> {
    let store = MemoryStore::new();
    seed_user(&store, "alice", "user").await?;

    let alice = Principal::authenticated("alice");
    let err = store
        .update(&alice, collections::USERS, "alice", doc(json!({ "role": "superadmin" })))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));

    // The record is untouched
    let after = store.get(&alice, collections::USERS, "alice").await?;
    assert_eq!(after.get("role"), Some(&json!("user")));
    Ok(())
}

#[tokio::test]
async fn even_a_role_change_bundled_with_benign_fields_is_denied() -> Result<()> {
    let store = MemoryStore::new();
    seed_user(&store, "alice", "user").await?;

    let alice = Principal::authenticated("alice");
    let err = store
        .update(
            &alice,
            collections::USERS,
            "alice",
            doc(json!({ "displayName": "Just renaming", "role": "admin" })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    Ok(())
}

#[tokio::test]
async fn admins_read_anyone_and_may_change_roles() -> Result<()> {
    let store = MemoryStore::new();
    seed_user(&store, "root", "admin").await?;
    seed_user(&store, "alice", "user").await?;

    let root = Principal::authenticated("root");
    let alice_doc = store.get(&root, collections::USERS, "alice").await?;
    assert_eq!(alice_doc.get("role"), Some(&json!("user")));

    store
        .update(&root, collections::USERS, "alice", doc(json!({ "role": "coach" })))
        .await?;
    let after = store.get(&root, collections::USERS, "alice").await?;
    assert_eq!(after.get("role"), Some(&json!("coach")));
    Ok(())
}

#[tokio::test]
async fn only_superadmin_deletes_accounts() -> Result<()> {
    let store = MemoryStore::new();
    seed_user(&store, "root", "admin").await?;
    seed_user(&store, "boss", "superadmin").await?;
    seed_user(&store, "alice", "user").await?;

    let root = Principal::authenticated("root");
    let err = store.delete(&root, collections::USERS, "alice").await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));

    let boss = Principal::authenticated("boss");
    store.delete(&boss, collections::USERS, "alice").await?;
    let err = store.get(&boss, collections::USERS, "alice").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn client_side_signup_writes_are_denied() -> Result<()> {
    let store = MemoryStore::new();
    let mallory = Principal::authenticated("mallory");
    let err = store
        .create(
            &mallory,
            collections::USERS,
            "mallory",
            doc(json!({ "role": "admin", "email": "mallory@example.com" })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
    Ok(())
}
