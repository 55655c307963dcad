use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, patch, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/authorization/me",
            get(handlers::authorization::me_handler),
        )
        .route(
            "/api/authorization/check",
            post(handlers::authorization::check_permission_handler),
        )
        .route(
            "/api/security/permissions",
            get(handlers::security::list_permissions_handler),
        )
        .route(
            "/api/security/roles",
            get(handlers::security::list_roles_handler)
                .post(handlers::security::create_role_handler),
        )
        .route(
            "/api/security/roles/{role_id}",
            patch(handlers::security::update_role_handler),
        )
        .route(
            "/api/security/roles/{role_id}/retire",
            post(handlers::security::retire_role_handler),
        )
        .route(
            "/api/security/roles/{role_id}/permissions",
            get(handlers::security::list_role_permissions_handler)
                .put(handlers::security::set_role_permissions_handler),
        )
        .route(
            "/api/security/role-assignments",
            get(handlers::security::list_role_assignments_handler)
                .post(handlers::security::assign_role_handler)
                .delete(handlers::security::revoke_role_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
