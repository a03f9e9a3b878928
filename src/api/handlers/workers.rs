use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{users::CurrentUser, workers::{AddWorkerRequest, MembershipResponse}},
    authz::{Decision, StoreAction, decide},
    db::{self, Backend as _, models::memberships::MembershipCreateDBRequest},
    errors::{Error, Result},
    types::{StoreId, UserId},
};

/// Add a worker to a store's roster.
///
/// Granting Owner or Manager requires the actor to be an Owner; granting an
/// operational role requires Owner or Manager.
#[utoipa::path(
    post,
    path = "/stores/{id}/workers",
    tag = "workers",
    request_body = AddWorkerRequest,
    params(("id" = uuid::Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Worker added", body = MembershipResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Store or user not found"),
        (status = 409, description = "User already assigned to the store"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(store_id = %crate::types::abbrev_uuid(&store_id), user_id = %crate::types::abbrev_uuid(&user.id)))]
pub async fn add_worker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(store_id): Path<StoreId>,
    Json(request): Json<AddWorkerRequest>,
) -> Result<Json<MembershipResponse>> {
    // Existence before authorization: the store, then the target user
    if state.db.get_store(store_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Store".to_string(),
            id: store_id.to_string(),
        });
    }
    if state.db.get_user_by_id(request.user_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "User".to_string(),
            id: request.user_id.to_string(),
        });
    }

    let action = StoreAction::AddWorker(request.role);
    let actor_role = db::get_role(state.db.as_ref(), user.id, store_id).await?;
    if decide(actor_role, action) == Decision::Deny {
        return Err(Error::InsufficientRole { action, store_id });
    }

    // The membership primary key arbitrates races; a duplicate insert comes
    // back as a conflict, never a second row.
    let membership = state
        .db
        .create_membership(&MembershipCreateDBRequest {
            user_id: request.user_id,
            store_id,
            role: request.role,
        })
        .await
        .map_err(|e| {
            if e.is_duplicate_membership() {
                Error::Conflict {
                    message: "User is already assigned to this store".to_string(),
                }
            } else {
                Error::Database(e)
            }
        })?;

    Ok(Json(MembershipResponse::from(membership)))
}

/// Remove a worker from a store's roster.
///
/// The required actor role depends on the role of the worker being removed,
/// mirroring the add rules.
#[utoipa::path(
    delete,
    path = "/stores/{id}/workers/{user_id}",
    tag = "workers",
    params(
        ("id" = uuid::Uuid, Path, description = "Store ID"),
        ("user_id" = uuid::Uuid, Path, description = "Worker's user ID"),
    ),
    responses(
        (status = 204, description = "Worker removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Store or membership not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(store_id = %crate::types::abbrev_uuid(&store_id), worker_id = %crate::types::abbrev_uuid(&worker_id), user_id = %crate::types::abbrev_uuid(&user.id)))]
pub async fn remove_worker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((store_id, worker_id)): Path<(StoreId, UserId)>,
) -> Result<StatusCode> {
    if state.db.get_store(store_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Store".to_string(),
            id: store_id.to_string(),
        });
    }

    // The decision depends on the target's current role, so resolve the
    // membership first; an absent membership is 404 regardless of the actor.
    let target = state
        .db
        .get_membership(worker_id, store_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Worker".to_string(),
            id: worker_id.to_string(),
        })?;

    let action = StoreAction::RemoveWorker(target.role);
    let actor_role = db::get_role(state.db.as_ref(), user.id, store_id).await?;
    if decide(actor_role, action) == Decision::Deny {
        return Err(Error::InsufficientRole { action, store_id });
    }

    if !state.db.delete_membership(worker_id, store_id).await? {
        return Err(Error::NotFound {
            resource: "Worker".to_string(),
            id: worker_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::models::workers::MembershipResponse;
    use crate::authz::Role;
    use crate::db::Backend as _;
    use crate::test_utils::{add_worker, create_test_server, create_test_server_with_state, create_test_store, register_and_login};

    /// The roster scenario from end to end: Alice founds a store, staffs it,
    /// Bob overreaches, Alice lets him go.
    #[test_log::test(tokio::test)]
    async fn test_roster_lifecycle_scenario() {
        let server = create_test_server();
        let (alice_token, _alice) = register_and_login(&server, "alice", "alice@x.com").await;
        let (bob_token, bob) = register_and_login(&server, "bob", "bob@x.com").await;
        let (_carol_token, carol) = register_and_login(&server, "carol", "carol@x.com").await;

        let store = create_test_store(&server, &alice_token, "Alice's Shop").await;

        // Alice (Owner) adds Bob as Salesperson
        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&alice_token)
            .json(&json!({ "user_id": bob.id, "role": "Salesperson" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let membership: MembershipResponse = response.json();
        assert_eq!(membership.user_id, bob.id);
        assert_eq!(membership.role, Role::Salesperson);

        // Bob (Salesperson) tries to add Carol as Manager
        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&bob_token)
            .json(&json!({ "user_id": carol.id, "role": "Manager" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        // Alice removes Bob
        let response = server
            .delete(&format!("/stores/{}/workers/{}", store.id, bob.id))
            .authorization_bearer(&alice_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        // Removing an already-removed membership is NotFound, never a silent success
        let response = server
            .delete(&format!("/stores/{}/workers/{}", store.id, bob.id))
            .authorization_bearer(&alice_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_manager_grants_operational_roles_only() {
        let server = create_test_server();
        let (owner_token, _alice) = register_and_login(&server, "alice", "alice@x.com").await;
        let (manager_token, bob) = register_and_login(&server, "bob", "bob@x.com").await;
        let (_token, carol) = register_and_login(&server, "carol", "carol@x.com").await;
        let (_token, dave) = register_and_login(&server, "dave", "dave@x.com").await;

        let store = create_test_store(&server, &owner_token, "Alice's Shop").await;
        add_worker(&server, &owner_token, store.id, bob.id, Role::Manager).await;

        // Manager adds a Delivery worker: allowed
        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&manager_token)
            .json(&json!({ "user_id": carol.id, "role": "Delivery" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        // Manager grants Owner: denied
        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&manager_token)
            .json(&json!({ "user_id": dave.id, "role": "Owner" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        // Owner grants Manager: allowed
        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&owner_token)
            .json(&json!({ "user_id": dave.id, "role": "Manager" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[test_log::test(tokio::test)]
    async fn test_duplicate_membership_is_conflict() {
        let server = create_test_server();
        let (owner_token, _alice) = register_and_login(&server, "alice", "alice@x.com").await;
        let (_token, bob) = register_and_login(&server, "bob", "bob@x.com").await;

        let store = create_test_store(&server, &owner_token, "Alice's Shop").await;
        add_worker(&server, &owner_token, store.id, bob.id, Role::Salesperson).await;

        // Same user again, even with a different role
        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&owner_token)
            .json(&json!({ "user_id": bob.id, "role": "Delivery" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    #[test_log::test(tokio::test)]
    async fn test_add_worker_missing_store_or_user() {
        let server = create_test_server();
        let (token, alice) = register_and_login(&server, "alice", "alice@x.com").await;
        let store = create_test_store(&server, &token, "Alice's Shop").await;

        // Missing store reads as 404 before any role check
        let response = server
            .post(&format!("/stores/{}/workers", uuid::Uuid::new_v4()))
            .authorization_bearer(&token)
            .json(&json!({ "user_id": alice.id, "role": "Delivery" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        // Missing target user
        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&token)
            .json(&json!({ "user_id": uuid::Uuid::new_v4(), "role": "Delivery" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_non_member_cannot_manage_roster() {
        let server = create_test_server();
        let (owner_token, _alice) = register_and_login(&server, "alice", "alice@x.com").await;
        let (outsider_token, _mallory) = register_and_login(&server, "mallory", "mallory@x.com").await;
        let (_token, bob) = register_and_login(&server, "bob", "bob@x.com").await;

        let store = create_test_store(&server, &owner_token, "Alice's Shop").await;
        add_worker(&server, &owner_token, store.id, bob.id, Role::Salesperson).await;

        let response = server
            .post(&format!("/stores/{}/workers", store.id))
            .authorization_bearer(&outsider_token)
            .json(&json!({ "user_id": bob.id, "role": "Owner" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let response = server
            .delete(&format!("/stores/{}/workers/{}", store.id, bob.id))
            .authorization_bearer(&outsider_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[test_log::test(tokio::test)]
    async fn test_manager_cannot_remove_privileged_members() {
        let server = create_test_server();
        let (owner_token, alice) = register_and_login(&server, "alice", "alice@x.com").await;
        let (manager_token, bob) = register_and_login(&server, "bob", "bob@x.com").await;

        let store = create_test_store(&server, &owner_token, "Alice's Shop").await;
        add_worker(&server, &owner_token, store.id, bob.id, Role::Manager).await;

        // Manager removing the Owner: denied
        let response = server
            .delete(&format!("/stores/{}/workers/{}", store.id, alice.id))
            .authorization_bearer(&manager_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        // Owner removing the Manager: allowed
        let response = server
            .delete(&format!("/stores/{}/workers/{}", store.id, bob.id))
            .authorization_bearer(&owner_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    }

    /// Removing the last Owner is permitted: nothing special-cases
    /// self-removal or the final Owner, which leaves the store without
    /// anyone able to manage it.
    #[test_log::test(tokio::test)]
    async fn test_last_owner_may_remove_themselves() {
        let (server, state) = create_test_server_with_state();
        let (token, alice) = register_and_login(&server, "alice", "alice@x.com").await;
        let store = create_test_store(&server, &token, "Alice's Shop").await;

        let response = server
            .delete(&format!("/stores/{}/workers/{}", store.id, alice.id))
            .authorization_bearer(&token)
            .await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        // The store survives without any membership
        assert!(state.db.get_store(store.id).await.unwrap().is_some());
        assert!(state.db.get_membership(alice.id, store.id).await.unwrap().is_none());

        // Alice is now an outsider to her own store
        let response = server
            .put(&format!("/stores/{}", store.id))
            .authorization_bearer(&token)
            .json(&json!({ "name": "Locked Out" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}
