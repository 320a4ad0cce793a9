pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sea_orm::DatabaseConnection;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shiftdesk API",
        version = "0.1.0",
        description = "REST API for multi-tenant workforce scheduling",
        contact(
            name = "Shiftdesk Team",
            email = "team@shiftdesk.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::workspaces::list_workspaces,
        handlers::workspaces::create_workspace,
        handlers::workspaces::get_workspace,
        handlers::workspaces::update_workspace,
        handlers::workspaces::delete_workspace,
        handlers::workspaces::transfer_owner,
        handlers::members::list_members,
        handlers::members::add_member,
        handlers::members::update_member,
        handlers::members::remove_member,
        handlers::members::get_permissions,
        handlers::members::update_permissions,
        handlers::roles::list_roles,
        handlers::roles::create_role,
        handlers::roles::update_role,
        handlers::roles::delete_role,
        handlers::roles::list_member_roles,
        handlers::roles::add_member_role,
        handlers::roles::remove_member_role,
        handlers::shifts::list_shifts,
        handlers::shifts::create_shift,
        handlers::shifts::get_shift,
        handlers::shifts::update_shift,
        handlers::shifts::delete_shift,
    ),
    components(
        schemas(
            models::HealthResponse,
            models::ErrorResponse,
            models::Workspace,
            models::WorkspaceList,
            models::CreateWorkspaceRequest,
            models::UpdateWorkspaceRequest,
            models::TransferOwnerRequest,
            models::Permissions,
            models::Member,
            models::MemberList,
            models::AddMemberRequest,
            models::UpdateMemberRequest,
            models::UpdatePermissionsRequest,
            models::Role,
            models::RoleList,
            models::CreateRoleRequest,
            models::UpdateRoleRequest,
            models::MemberRoleAssignment,
            models::ShiftStatus,
            models::Shift,
            models::ShiftList,
            models::CreateShiftRequest,
            models::UpdateShiftRequest,
            models::ShiftQuery,
        )
    ),
    tags(
        (name = "workspaces", description = "Workspace and ownership endpoints"),
        (name = "members", description = "Membership and permission endpoints"),
        (name = "roles", description = "Role and role assignment endpoints"),
        (name = "shifts", description = "Shift scheduling endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// HS256 secret session tokens are signed with
    pub jwt_secret: String,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            enable_cors: true,
            jwt_secret: String::new(),
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let state = Arc::new(AppState { db });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let jwt_state = Arc::new(middleware::JwtState::new(
            self.config.jwt_secret.as_bytes(),
        ));

        // PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .with_state(self.state.clone());

        // PROTECTED routes (require a session token)
        let protected_router = Router::new()
            .route(
                "/api/workspaces",
                get(handlers::workspaces::list_workspaces)
                    .post(handlers::workspaces::create_workspace),
            )
            .route(
                "/api/workspaces/{id}",
                get(handlers::workspaces::get_workspace)
                    .patch(handlers::workspaces::update_workspace)
                    .delete(handlers::workspaces::delete_workspace),
            )
            .route(
                "/api/workspaces/{id}/transfer-owner",
                post(handlers::workspaces::transfer_owner),
            )
            .route(
                "/api/workspaces/{id}/members",
                get(handlers::members::list_members).post(handlers::members::add_member),
            )
            .route(
                "/api/workspaces/{id}/members/{member_id}",
                patch(handlers::members::update_member).delete(handlers::members::remove_member),
            )
            .route(
                "/api/workspaces/{id}/permissions",
                get(handlers::members::get_permissions),
            )
            .route(
                "/api/workspaces/{id}/members/{member_id}/permissions",
                patch(handlers::members::update_permissions),
            )
            .route(
                "/api/workspaces/{id}/roles",
                get(handlers::roles::list_roles).post(handlers::roles::create_role),
            )
            .route(
                "/api/roles/{role_id}",
                patch(handlers::roles::update_role).delete(handlers::roles::delete_role),
            )
            .route(
                "/api/members/{member_id}/roles",
                get(handlers::roles::list_member_roles),
            )
            .route(
                "/api/members/{member_id}/roles/{role_id}",
                put(handlers::roles::add_member_role).delete(handlers::roles::remove_member_role),
            )
            .route(
                "/api/shifts",
                get(handlers::shifts::list_shifts).post(handlers::shifts::create_shift),
            )
            .route(
                "/api/shifts/{id}",
                get(handlers::shifts::get_shift)
                    .patch(handlers::shifts::update_shift)
                    .delete(handlers::shifts::delete_shift),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state,
                middleware::require_auth,
            ));

        let api_router = public_router.merge(protected_router);

        // SwaggerUi serves the OpenAPI document at /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Cookie auth needs credentials, which rules out a wildcard origin
            let cors = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
