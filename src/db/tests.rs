//! Backend contract tests, run against the in-memory implementation.
//!
//! These pin down the constraint behavior both backends must share: the
//! membership uniqueness invariant, the explicit cascade on store deletion,
//! and coalescing partial updates.

use crate::authz::Role;
use crate::db::errors::DbError;
use crate::db::models::memberships::MembershipCreateDBRequest;
use crate::db::models::stores::{StoreCreateDBRequest, StoreUpdateDBRequest};
use crate::db::models::users::UserCreateDBRequest;
use crate::db::{Backend, MemoryBackend, get_role};

fn user_request(username: &str, email: &str) -> UserCreateDBRequest {
    UserCreateDBRequest {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$fake".to_string(),
    }
}

fn store_request(name: &str) -> StoreCreateDBRequest {
    StoreCreateDBRequest {
        name: name.to_string(),
        description: Some("corner shop".to_string()),
        city: Some("Havana".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn duplicate_email_is_a_unique_violation() {
    let backend = MemoryBackend::new();
    backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();

    let err = backend.create_user(&user_request("alice2", "alice@x.com")).await.unwrap_err();
    match err {
        DbError::UniqueViolation { constraint, table, .. } => {
            assert_eq!(table.as_deref(), Some("users"));
            assert!(constraint.unwrap().contains("email"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_username_is_a_unique_violation() {
    let backend = MemoryBackend::new();
    backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();

    let err = backend.create_user(&user_request("alice", "other@x.com")).await.unwrap_err();
    match err {
        DbError::UniqueViolation { constraint, .. } => {
            assert!(constraint.unwrap().contains("username"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[tokio::test]
async fn store_creator_becomes_owner() {
    let backend = MemoryBackend::new();
    let alice = backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();

    let (store, membership) = backend.create_store_with_owner(alice.id, &store_request("Alice's Shop")).await.unwrap();

    assert_eq!(membership.user_id, alice.id);
    assert_eq!(membership.store_id, store.id);
    assert_eq!(membership.role, Role::Owner);
    assert_eq!(get_role(&backend, alice.id, store.id).await.unwrap(), Some(Role::Owner));
}

#[tokio::test]
async fn at_most_one_membership_per_user_store_pair() {
    let backend = MemoryBackend::new();
    let alice = backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();
    let bob = backend.create_user(&user_request("bob", "bob@x.com")).await.unwrap();
    let (store, _) = backend.create_store_with_owner(alice.id, &store_request("Alice's Shop")).await.unwrap();

    backend
        .create_membership(&MembershipCreateDBRequest {
            user_id: bob.id,
            store_id: store.id,
            role: Role::Salesperson,
        })
        .await
        .unwrap();

    // A second row for the same pair must fail, even with a different role.
    let err = backend
        .create_membership(&MembershipCreateDBRequest {
            user_id: bob.id,
            store_id: store.id,
            role: Role::Manager,
        })
        .await
        .unwrap_err();
    assert!(err.is_duplicate_membership(), "got {err:?}");

    // The original grant is untouched.
    assert_eq!(get_role(&backend, bob.id, store.id).await.unwrap(), Some(Role::Salesperson));
}

#[tokio::test]
async fn membership_for_missing_user_or_store_is_a_fk_violation() {
    let backend = MemoryBackend::new();
    let alice = backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();
    let (store, _) = backend.create_store_with_owner(alice.id, &store_request("Alice's Shop")).await.unwrap();

    let err = backend
        .create_membership(&MembershipCreateDBRequest {
            user_id: uuid::Uuid::new_v4(),
            store_id: store.id,
            role: Role::Delivery,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "got {err:?}");

    let err = backend
        .create_membership(&MembershipCreateDBRequest {
            user_id: alice.id,
            store_id: uuid::Uuid::new_v4(),
            role: Role::Delivery,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "got {err:?}");
}

#[tokio::test]
async fn deleting_a_store_cascades_memberships() {
    let backend = MemoryBackend::new();
    let alice = backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();
    let bob = backend.create_user(&user_request("bob", "bob@x.com")).await.unwrap();
    let (store, _) = backend.create_store_with_owner(alice.id, &store_request("Alice's Shop")).await.unwrap();
    backend
        .create_membership(&MembershipCreateDBRequest {
            user_id: bob.id,
            store_id: store.id,
            role: Role::Delivery,
        })
        .await
        .unwrap();

    assert!(backend.delete_store(store.id).await.unwrap());

    assert!(backend.get_store(store.id).await.unwrap().is_none());
    assert!(backend.get_membership(alice.id, store.id).await.unwrap().is_none());
    assert!(backend.get_membership(bob.id, store.id).await.unwrap().is_none());

    // Second delete reports nothing removed.
    assert!(!backend.delete_store(store.id).await.unwrap());
}

#[tokio::test]
async fn partial_update_leaves_absent_fields_unchanged() {
    let backend = MemoryBackend::new();
    let alice = backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();
    let (store, _) = backend.create_store_with_owner(alice.id, &store_request("Alice's Shop")).await.unwrap();

    let updated = backend
        .update_store(
            store.id,
            &StoreUpdateDBRequest {
                name: Some("Alice's Emporium".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Alice's Emporium");
    assert_eq!(updated.description.as_deref(), Some("corner shop"));
    assert_eq!(updated.city.as_deref(), Some("Havana"));
}

#[tokio::test]
async fn update_of_missing_store_is_not_found() {
    let backend = MemoryBackend::new();
    let err = backend
        .update_store(uuid::Uuid::new_v4(), &StoreUpdateDBRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound), "got {err:?}");
}

#[tokio::test]
async fn delete_membership_reports_absence() {
    let backend = MemoryBackend::new();
    let alice = backend.create_user(&user_request("alice", "alice@x.com")).await.unwrap();
    let (store, _) = backend.create_store_with_owner(alice.id, &store_request("Alice's Shop")).await.unwrap();

    assert!(backend.delete_membership(alice.id, store.id).await.unwrap());
    assert!(!backend.delete_membership(alice.id, store.id).await.unwrap());
}
