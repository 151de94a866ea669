//! Record store behaviour, run against both backends.
//!
//! Each property is written once against `RecordStore` and exercised on the
//! SQLite `Database` and on `MemoryStore`.

use std::fs;

use hermes_db::{Database, DbConfig, MemoryStore, RecordStore, StoreError};
use hermes_types::{Channel, ChannelDraft, RecordId, User, UserDraft, ValidationError};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hermes_db=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn sqlite() -> Database {
    init_tracing();
    Database::open_in_memory().unwrap()
}

fn memory() -> MemoryStore {
    init_tracing();
    MemoryStore::new()
}

// -- Properties --

fn user_minimal_write<S: RecordStore>(store: &S) {
    let user: User = store
        .create_document(&json!({ "email": "a@x.com", "displayName": "A" }))
        .unwrap();

    assert!(user.channels.is_empty());
    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        json!({ "id": user.id.as_str(), "email": "a@x.com", "displayName": "A", "channels": [] })
    );
}

fn channel_full_write<S: RecordStore>(store: &S) {
    let channel: Channel = store
        .create_document(&json!({ "name": "Team", "private": false, "users": ["u1", "u2"] }))
        .unwrap();

    assert_eq!(channel.name, "Team");
    assert!(!channel.private);
    assert_eq!(channel.users, vec![RecordId::from("u1"), RecordId::from("u2")]);

    let stored: Channel = store.read(&channel.id).unwrap().unwrap();
    assert_eq!(stored, channel);
}

fn channel_defaults<S: RecordStore>(store: &S) {
    let channel = store
        .create(ChannelDraft {
            users: Some(vec![]),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(channel.name, "New Channel");
    assert!(channel.private);
    assert!(channel.users.is_empty());
}

fn channel_without_users_rejected<S: RecordStore>(store: &S) {
    let err = store
        .create_document::<Channel>(&json!({ "private": false }))
        .unwrap_err();

    assert!(err.is_validation());
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::MissingField { field: "users", .. })
    ));
    assert!(store.list::<Channel>().unwrap().is_empty());
}

fn user_required_fields<S: RecordStore>(store: &S) {
    for doc in [
        json!({ "displayName": "A" }),
        json!({ "email": "a@x.com" }),
        json!({}),
    ] {
        let err = store.create_document::<User>(&doc).unwrap_err();
        assert!(err.is_validation(), "{doc} should be rejected");
    }
    assert!(store.list::<User>().unwrap().is_empty());
}

fn ids_unique_and_round_trip<S: RecordStore>(store: &S) {
    let a = store
        .create(UserDraft {
            email: Some("a@x.com".into()),
            display_name: Some("A".into()),
            channels: None,
        })
        .unwrap();
    // Same email again: no uniqueness constraint.
    let b = store
        .create(UserDraft {
            email: Some("a@x.com".into()),
            display_name: Some("B".into()),
            channels: Some(vec!["c1".into()]),
        })
        .unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(store.read::<User>(&a.id).unwrap(), Some(a.clone()));
    assert_eq!(store.read::<User>(&b.id).unwrap(), Some(b.clone()));
    assert_eq!(store.list::<User>().unwrap(), vec![a, b]);
}

fn update_replaces_and_keeps_id<S: RecordStore>(store: &S) {
    let channel: Channel = store
        .create_document(&json!({ "name": "Team", "users": [] }))
        .unwrap();

    let mut draft = ChannelDraft::from(channel.clone());
    draft.users = Some(vec!["u1".into()]);
    draft.private = Some(false);
    let updated = store.update(&channel.id, draft).unwrap();

    assert_eq!(updated.id, channel.id);
    assert_eq!(updated.name, "Team");
    assert_eq!(store.read::<Channel>(&channel.id).unwrap(), Some(updated));

    // Full replacement: omitted optionals fall back to defaults.
    let reset: Channel = store
        .update_document(&channel.id, &json!({ "users": ["u1"] }))
        .unwrap();
    assert_eq!(reset.name, "New Channel");
    assert!(reset.private);

    // Invalid replacement leaves the stored record alone.
    let err = store
        .update_document::<Channel>(&channel.id, &json!({ "name": "Gone" }))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.read::<Channel>(&channel.id).unwrap(), Some(reset));
}

fn update_missing_is_not_found<S: RecordStore>(store: &S) {
    let err = store
        .update(
            &RecordId::from("missing"),
            ChannelDraft {
                users: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { ref collection, .. } if collection == "channels"));
}

fn delete_removes<S: RecordStore>(store: &S) {
    let user: User = store
        .create_document(&json!({ "email": "a@x.com", "displayName": "A" }))
        .unwrap();

    // Wrong collection does not touch it.
    assert!(!store.delete::<Channel>(&user.id).unwrap());
    assert!(store.delete::<User>(&user.id).unwrap());
    assert!(!store.delete::<User>(&user.id).unwrap());
    assert_eq!(store.read::<User>(&user.id).unwrap(), None);
}

fn membership_is_advisory<S: RecordStore>(store: &S) {
    // Members that reference nothing are accepted, and the user side is
    // not updated to match.
    let user: User = store
        .create_document(&json!({ "email": "a@x.com", "displayName": "A" }))
        .unwrap();
    let channel: Channel = store
        .create_document(&json!({ "users": [user.id.as_str(), "ghost"] }))
        .unwrap();

    assert!(channel.has_member(&user.id));
    let user: User = store.read(&user.id).unwrap().unwrap();
    assert!(!user.has_joined(&channel.id));
}

macro_rules! against_both_backends {
    ($($name:ident),* $(,)?) => {
        mod sqlite_backend {
            use super::*;
            $( #[test] fn $name() { super::$name(&sqlite()); } )*
        }

        mod memory_backend {
            use super::*;
            $( #[test] fn $name() { super::$name(&memory()); } )*
        }
    };
}

against_both_backends!(
    user_minimal_write,
    channel_full_write,
    channel_defaults,
    channel_without_users_rejected,
    user_required_fields,
    ids_unique_and_round_trip,
    update_replaces_and_keeps_id,
    update_missing_is_not_found,
    delete_removes,
    membership_is_advisory,
);

// -- SQLite only --

#[test]
fn records_survive_reopen() {
    init_tracing();

    let dir = std::env::temp_dir().join(format!("hermes_db_test_{}", RecordId::generate()));
    fs::create_dir_all(&dir).unwrap();
    let config = DbConfig {
        path: dir.join("hermes.db"),
        table_prefix: "chat_".into(),
        ..DbConfig::default()
    };

    let channel: Channel = {
        let db = Database::from_config(&config).unwrap();
        db.create_document(&json!({ "name": "Team", "users": ["u1"] }))
            .unwrap()
    };

    let db = Database::from_config(&config).unwrap();
    assert_eq!(db.read::<Channel>(&channel.id).unwrap(), Some(channel));
    assert_eq!(db.count("channels").unwrap(), 1);

    drop(db);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_table_prefix_is_refused() {
    let config = DbConfig {
        table_prefix: "bad-prefix".into(),
        ..DbConfig::in_memory()
    };
    assert!(Database::from_config(&config).is_err());
}

#[test]
fn empty_database_path_is_refused() {
    let config = DbConfig {
        path: "".into(),
        ..DbConfig::default()
    };
    assert!(Database::from_config(&config).is_err());
}
