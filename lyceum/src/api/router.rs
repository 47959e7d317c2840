use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use lyceum_core::api::ServerInfo;
use lyceum_core::authorization::catalog::{
    ADMIN_AUDIT, ADMIN_SETTINGS, SETTINGS_EDIT, USERS_ROLES, USERS_VIEW,
};
use lyceum_core::authorization::{
    AccessDecision, EffectivePermissions, Permission, PermissionCode, Role,
};
use lyceum_core::settings::api_server::AuthMode;

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::admin::assignments::{
    __path_assign_role_handler, __path_get_user_permissions_handler,
    __path_get_user_roles_handler, __path_revoke_role_handler, assign_role_handler,
    get_user_permissions_handler, get_user_roles_handler, revoke_role_handler,
    RoleAssignmentRequest, UserAssignmentsResponse, UserPermissionsResponse,
};
use crate::api::handlers::admin::audit_logs::{
    __path_audit_statistics_handler, __path_list_audit_logs_handler,
    __path_purge_audit_logs_handler, audit_statistics_handler, list_audit_logs_handler,
    purge_audit_logs_handler, AuditLogResponse, PurgeAuditLogsRequest, PurgeAuditLogsResponse,
};
use crate::api::handlers::admin::permissions::{
    __path_check_permission_handler, __path_list_permissions_handler,
    __path_permission_matrix_handler, check_permission_handler, list_permissions_handler,
    permission_matrix_handler, PermissionCheckRequest, PermissionListResponse,
};
use crate::api::handlers::admin::policy::{
    __path_reload_policy_handler, reload_policy_handler, PolicyReloadResponse,
};
use crate::api::handlers::admin::roles::{
    __path_get_role_handler, __path_list_roles_handler, get_role_handler, list_roles_handler,
    RolesListResponse,
};
use crate::api::handlers::health::{__path_health_checker_handler, health_checker_handler};
use crate::api::handlers::info::{__path_info_handler, info_handler};
use crate::api::handlers::me::{
    __path_my_access_handler, __path_my_permissions_handler, my_access_handler,
    my_permissions_handler, AccessCheckResponse, MyPermissionsResponse,
};
use crate::app_state::SharedAppState;
use crate::services::audit::{AuditEntry, AuditStatistics};
use crate::services::authorization::types::{
    Assignment, PermissionMatrix, PermissionMatrixRow, RoleSummary,
};

use super::basic_auth::auth;
use super::error::AppError;
use super::middleware::authorization::require_permission;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_checker_handler,
        info_handler,
        my_permissions_handler,
        my_access_handler,
        list_permissions_handler,
        permission_matrix_handler,
        check_permission_handler,
        list_roles_handler,
        get_role_handler,
        get_user_roles_handler,
        get_user_permissions_handler,
        assign_role_handler,
        revoke_role_handler,
        reload_policy_handler,
        list_audit_logs_handler,
        audit_statistics_handler,
        purge_audit_logs_handler,
    ),
    components(
        schemas(
            ServerInfo, AuthMode, AppError,
            Permission, PermissionCode, Role, AccessDecision, EffectivePermissions,
            Assignment, PermissionMatrix, PermissionMatrixRow, RoleSummary,
            AccessCheckResponse, MyPermissionsResponse, PermissionCheckRequest,
            PermissionListResponse, RolesListResponse, RoleAssignmentRequest,
            UserAssignmentsResponse, UserPermissionsResponse, PolicyReloadResponse,
            AuditEntry, AuditStatistics, AuditLogResponse, PurgeAuditLogsRequest,
            PurgeAuditLogsResponse
        )
    ),
    tags(
        (name = "lyceum-service", description = "lyceum authorization api")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

pub struct ApiRoutes;

impl ApiRoutes {
    pub fn create(state: SharedAppState) -> Router {
        let api = ApiDoc::openapi();
        let authenticated_router = Router::new()
            .route(
                "/api/v1/authenticated/me/permissions",
                get(my_permissions_handler),
            )
            .route("/api/v1/authenticated/me/can", get(my_access_handler))
            .route(
                "/api/v1/authenticated/admin/permissions",
                get(list_permissions_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_VIEW))),
            )
            .route(
                "/api/v1/authenticated/admin/permissions/matrix",
                get(permission_matrix_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_VIEW))),
            )
            .route(
                "/api/v1/authenticated/admin/permissions/check",
                post(check_permission_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_VIEW))),
            )
            .route(
                "/api/v1/authenticated/admin/roles",
                get(list_roles_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_VIEW))),
            )
            .route(
                "/api/v1/authenticated/admin/roles/{role}",
                get(get_role_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_VIEW))),
            )
            .route(
                "/api/v1/authenticated/admin/users/{user_id}/permissions",
                get(get_user_permissions_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_VIEW))),
            )
            .route(
                "/api/v1/authenticated/admin/users/{user_id}/roles",
                get(get_user_roles_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_VIEW)))
                    .merge(
                        post(assign_role_handler)
                            .delete(revoke_role_handler)
                            .layer(middleware::from_fn_with_state(state.clone(), require_permission(USERS_ROLES))),
                    ),
            )
            .route(
                "/api/v1/authenticated/admin/policy/reload",
                post(reload_policy_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(SETTINGS_EDIT))),
            )
            .route(
                "/api/v1/authenticated/admin/audit-logs",
                get(list_audit_logs_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(ADMIN_AUDIT))),
            )
            .route(
                "/api/v1/authenticated/admin/audit-logs/statistics",
                get(audit_statistics_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(ADMIN_AUDIT))),
            )
            .route(
                "/api/v1/authenticated/admin/audit-logs/purge",
                post(purge_audit_logs_handler)
                    .layer(middleware::from_fn_with_state(state.clone(), require_permission(ADMIN_SETTINGS))),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), auth));

        let public_router = Router::new()
            .route("/api/v1/health", get(health_checker_handler))
            .route("/api/v1/info", get(info_handler))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api));

        Router::new()
            .merge(authenticated_router)
            .merge(public_router)
            .with_state(state)
    }
}
