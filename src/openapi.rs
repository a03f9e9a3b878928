//! OpenAPI documentation, rendered at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::stores::create_store,
        crate::api::handlers::stores::get_store,
        crate::api::handlers::stores::update_store,
        crate::api::handlers::stores::delete_store,
        crate::api::handlers::workers::add_worker,
        crate::api::handlers::workers::remove_worker,
    ),
    components(schemas(
        crate::api::models::auth::RegisterRequest,
        crate::api::models::auth::LoginRequest,
        crate::api::models::auth::LoginResponse,
        crate::api::models::users::UserResponse,
        crate::api::models::stores::StoreResponse,
        crate::api::models::stores::UpdateStoreRequest,
        crate::api::models::workers::AddWorkerRequest,
        crate::api::models::workers::MembershipResponse,
        crate::authz::Role,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "stores", description = "Store lifecycle"),
        (name = "workers", description = "Store roster management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
