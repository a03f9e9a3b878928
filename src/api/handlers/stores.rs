use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        stores::{StoreResponse, UpdateStoreRequest},
        users::CurrentUser,
    },
    authz::{Decision, StoreAction, decide},
    db::{self, Backend as _, models::stores::StoreCreateDBRequest},
    errors::{Error, Result},
    types::StoreId,
    uploads,
};

/// Create a store; the creator becomes its first Owner.
///
/// Accepts multipart form data so an optional binary logo can ride along
/// with the text fields.
#[utoipa::path(
    post,
    path = "/stores",
    tag = "stores",
    request_body(
        content_type = "multipart/form-data",
        description = "Store fields (name required) plus an optional logo file"
    ),
    responses(
        (status = 201, description = "Store created", body = StoreResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %crate::types::abbrev_uuid(&user.id)))]
pub async fn create_store(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoreResponse>)> {
    let mut request = StoreCreateDBRequest::default();
    let mut logo: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "logo" {
            let file_name = field.file_name().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("Failed to read logo: {e}"),
            })?;
            if data.len() as u64 > state.config.uploads.max_logo_size {
                return Err(Error::BadRequest {
                    message: format!("Logo exceeds the maximum size of {} bytes", state.config.uploads.max_logo_size),
                });
            }
            logo = Some((file_name, data.to_vec()));
            continue;
        }

        let value = field.text().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read field '{field_name}': {e}"),
        })?;
        match field_name.as_str() {
            "name" => request.name = value,
            "description" => request.description = Some(value),
            "address" => request.address = Some(value),
            "city" => request.city = Some(value),
            "municipality" => request.municipality = Some(value),
            "province" => request.province = Some(value),
            "phone_number" => request.phone_number = Some(value),
            "email" => request.email = Some(value),
            _ => {}
        }
    }

    if request.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Store name is required".to_string(),
        });
    }

    if let Some((file_name, bytes)) = logo {
        let path = uploads::store_logo(&state.config.uploads.directory, file_name.as_deref(), &bytes).await?;
        request.logo_path = Some(path);
    }

    // Store row and Owner membership are one transaction; the creator is
    // always the first Owner, so no authorization check applies here.
    let (store, _membership) = state.db.create_store_with_owner(user.id, &request).await?;

    Ok((StatusCode::CREATED, Json(StoreResponse::from(store))))
}

/// Get a store by ID. Public read, no authentication.
#[utoipa::path(
    get,
    path = "/stores/{id}",
    tag = "stores",
    params(("id" = uuid::Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store details", body = StoreResponse),
        (status = 404, description = "Store not found"),
    )
)]
#[tracing::instrument(skip_all, fields(store_id = %crate::types::abbrev_uuid(&store_id)))]
pub async fn get_store(State(state): State<AppState>, Path(store_id): Path<StoreId>) -> Result<Json<StoreResponse>> {
    match state.db.get_store(store_id).await? {
        Some(store) => Ok(Json(StoreResponse::from(store))),
        None => Err(Error::NotFound {
            resource: "Store".to_string(),
            id: store_id.to_string(),
        }),
    }
}

/// Update a store. Requires Owner or Manager role in the store.
#[utoipa::path(
    put,
    path = "/stores/{id}",
    tag = "stores",
    request_body = UpdateStoreRequest,
    params(("id" = uuid::Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store updated", body = StoreResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Store not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(store_id = %crate::types::abbrev_uuid(&store_id), user_id = %crate::types::abbrev_uuid(&user.id)))]
pub async fn update_store(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(store_id): Path<StoreId>,
    Json(request): Json<UpdateStoreRequest>,
) -> Result<Json<StoreResponse>> {
    // Existence before authorization
    if state.db.get_store(store_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Store".to_string(),
            id: store_id.to_string(),
        });
    }

    let actor_role = db::get_role(state.db.as_ref(), user.id, store_id).await?;
    if decide(actor_role, StoreAction::UpdateStore) == Decision::Deny {
        return Err(Error::InsufficientRole {
            action: StoreAction::UpdateStore,
            store_id,
        });
    }

    let store = state.db.update_store(store_id, &request.into()).await?;
    Ok(Json(StoreResponse::from(store)))
}

/// Delete a store. Requires Owner role; all memberships go with it.
#[utoipa::path(
    delete,
    path = "/stores/{id}",
    tag = "stores",
    params(("id" = uuid::Uuid, Path, description = "Store ID")),
    responses(
        (status = 204, description = "Store deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Store not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(store_id = %crate::types::abbrev_uuid(&store_id), user_id = %crate::types::abbrev_uuid(&user.id)))]
pub async fn delete_store(State(state): State<AppState>, user: CurrentUser, Path(store_id): Path<StoreId>) -> Result<StatusCode> {
    if state.db.get_store(store_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Store".to_string(),
            id: store_id.to_string(),
        });
    }

    let actor_role = db::get_role(state.db.as_ref(), user.id, store_id).await?;
    if decide(actor_role, StoreAction::DeleteStore) == Decision::Deny {
        return Err(Error::InsufficientRole {
            action: StoreAction::DeleteStore,
            store_id,
        });
    }

    if !state.db.delete_store(store_id).await? {
        return Err(Error::NotFound {
            resource: "Store".to_string(),
            id: store_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
