use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        users::{CurrentUser, UserResponse},
    },
    auth::{password, session},
    db::{Backend as _, models::users::UserCreateDBRequest},
    errors::{Error, Result},
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 200, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or username already in use"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<Json<UserResponse>> {
    // Validate before touching storage
    if request.username.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Username is required".to_string(),
        });
    }
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(Error::BadRequest {
            message: "A valid email address is required".to_string(),
        });
    }
    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    // Email and username uniqueness are separate checks with separate
    // errors. The unique constraints below remain the authority if two
    // registrations race.
    if state.db.get_user_by_email(&request.email).await?.is_some() {
        return Err(Error::Conflict {
            message: "An account with this email address already exists".to_string(),
        });
    }
    if state.db.get_user_by_username(&request.username).await?.is_some() {
        return Err(Error::Conflict {
            message: "This username is already taken".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created_user = state
        .db
        .create_user(&UserCreateDBRequest {
            username: request.username,
            email: request.email,
            password_hash,
        })
        .await?;

    Ok(Json(UserResponse::from(created_user)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>> {
    // Absent account and wrong password produce the identical error, so the
    // endpoint cannot be used to enumerate accounts.
    let user = state
        .db
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    let current_user = CurrentUser::from(user.clone());
    let access = session::create_session_token(&current_user, &state.config)?;

    Ok(Json(LoginResponse {
        access,
        user: UserResponse::from(user),
    }))
}
