//! Extractor for the authenticated user.
//!
//! Mutating endpoints take a [`CurrentUser`] argument; axum rejects the
//! request with 401 before the handler body runs if no valid bearer token is
//! present. The token is self-contained, so extraction never touches
//! storage.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::trace;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let auth_header = match parts.headers.get(axum::http::header::AUTHORIZATION) {
            Some(header) => header,
            None => {
                trace!("No authentication credentials found in request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let auth_str = auth_header.to_str().map_err(|e| Error::BadRequest {
            message: format!("Invalid authorization header: {e}"),
        })?;

        let token = auth_str.strip_prefix("Bearer ").ok_or(Error::Unauthenticated { message: None })?;

        session::verify_session_token(token, &state.config)
    }
}

#[cfg(test)]
mod tests {
    use crate::{api::models::users::CurrentUser, auth::session, test_utils::create_test_state};
    use axum::{extract::FromRequestParts as _, http::request::Parts};

    fn parts_with_header(name: &str, value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(name, value)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    #[tokio::test]
    async fn test_valid_bearer_token_extraction() {
        let state = create_test_state();
        let user = CurrentUser {
            id: uuid::Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
        };
        let token = session::create_session_token(&user, &state.config).unwrap();

        let mut parts = parts_with_header("authorization", &format!("Bearer {token}"));
        let extracted = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();

        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthenticated() {
        let state = create_test_state();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_rejected() {
        let state = create_test_state();
        let mut parts = parts_with_header("authorization", "Basic YWxpY2U6cHc=");

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let state = create_test_state();
        let mut parts = parts_with_header("authorization", "Bearer not-a-jwt");

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
