//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::events::SharedEventBus;
use crate::application::{
    BadgeIssuer, CheckpointService, FleetDirectory, HistoryService, IdentityService,
    SettingsService, WorkerDirectory,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, PaginationParams};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::ws::{ws_notifications_handler, NotificationState};
use crate::shared::SharedClock;

use super::modules::{
    auth, badges, checkpoint, fleet_profiles, health, history, metrics, request_id, settings,
    workers,
};

/// Everything the router needs to build its handler states
#[derive(Clone)]
pub struct ApiContext {
    pub repos: Arc<dyn RepositoryProvider>,
    /// `None` when running on the in-memory store
    pub db: Option<DatabaseConnection>,
    pub jwt_config: JwtConfig,
    pub event_bus: SharedEventBus,
    pub settings: SettingsService,
    pub clock: SharedClock,
    pub metrics: PrometheusHandle,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        // Auth
        auth::login,
        auth::get_current_user,
        auth::change_password,
        // Checkpoint
        checkpoint::register,
        checkpoint::probe_geofence,
        // Workers
        workers::list_workers,
        workers::get_worker,
        workers::create_worker,
        workers::update_worker,
        workers::set_worker_pin,
        workers::set_worker_password,
        workers::deactivate_worker,
        workers::reactivate_worker,
        // Fleet profiles
        fleet_profiles::list_fleet_profiles,
        fleet_profiles::get_fleet_profile,
        fleet_profiles::create_fleet_profile,
        fleet_profiles::update_fleet_profile,
        fleet_profiles::set_fleet_pin,
        fleet_profiles::deactivate_fleet_profile,
        fleet_profiles::reactivate_fleet_profile,
        // Badges
        badges::worker_badge,
        badges::fleet_badge,
        // History
        history::list_sessions,
        history::on_site_summary,
        history::list_fleet_access,
        // Settings
        settings::get_settings,
        settings::update_settings,
    ),
    components(
        schemas(
            ApiResponse<String>,
            PaginationParams,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::OperatorInfo,
            auth::ChangePasswordRequest,
            checkpoint::RegisterRequestDto,
            checkpoint::RegistrationResponse,
            checkpoint::GeofenceProbeRequest,
            checkpoint::GeofenceCheckDto,
            workers::WorkerDto,
            workers::CreateWorkerRequest,
            workers::UpdateWorkerRequest,
            workers::SetPinRequest,
            workers::SetPasswordRequest,
            fleet_profiles::FleetProfileDto,
            fleet_profiles::CreateFleetProfileRequest,
            fleet_profiles::UpdateFleetProfileRequest,
            badges::BadgeDto,
            history::AttendanceSessionDto,
            history::FleetAccessRecordDto,
            history::OnSiteSummaryDto,
            settings::SettingsDto,
            settings::UpdateSettingsRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Operator console login"),
        (name = "Checkpoint", description = "Dual-PIN check-in and check-out at the geofenced site"),
        (name = "Workers", description = "Worker administration"),
        (name = "Fleet Profiles", description = "Fleet profile administration"),
        (name = "Badges", description = "QR badge payloads"),
        (name = "History", description = "Attendance sessions, fleet access records, on-site summary"),
        (name = "Settings", description = "Geofence, badge rotation and labor limit settings"),
    ),
    info(
        title = "Gatekeeper Access Control API",
        version = "1.0.0",
        description = "Geofenced personnel and fleet access control",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };
    let auth_layer = || middleware::from_fn_with_state(auth_state.clone(), auth_middleware);

    let identity = Arc::new(IdentityService::new(ctx.repos.clone(), ctx.jwt_config.clone()));
    let checkpoint_service = Arc::new(CheckpointService::new(
        ctx.repos.clone(),
        ctx.settings.clone(),
        ctx.event_bus.clone(),
        ctx.clock.clone(),
    ));

    // Auth routes (public)
    let auth_handler_state = auth::AuthHandlerState { identity };
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .with_state(auth_handler_state.clone());

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/change-password", put(auth::change_password))
        .layer(auth_layer())
        .with_state(auth_handler_state);

    let checkpoint_routes = Router::new()
        .route("/register", post(checkpoint::register))
        .route("/geofence", post(checkpoint::probe_geofence))
        .layer(auth_layer())
        .with_state(checkpoint::CheckpointState {
            service: checkpoint_service,
        });

    let worker_routes = Router::new()
        .route("/", get(workers::list_workers).post(workers::create_worker))
        .route(
            "/{id}",
            get(workers::get_worker)
                .put(workers::update_worker)
                .delete(workers::deactivate_worker),
        )
        .route("/{id}/pin", put(workers::set_worker_pin))
        .route("/{id}/password", put(workers::set_worker_password))
        .route("/{id}/reactivate", post(workers::reactivate_worker))
        .layer(auth_layer())
        .with_state(workers::WorkerHandlerState {
            directory: Arc::new(WorkerDirectory::new(ctx.repos.clone())),
        });

    let fleet_routes = Router::new()
        .route(
            "/",
            get(fleet_profiles::list_fleet_profiles).post(fleet_profiles::create_fleet_profile),
        )
        .route(
            "/{id}",
            get(fleet_profiles::get_fleet_profile)
                .put(fleet_profiles::update_fleet_profile)
                .delete(fleet_profiles::deactivate_fleet_profile),
        )
        .route("/{id}/pin", put(fleet_profiles::set_fleet_pin))
        .route("/{id}/reactivate", post(fleet_profiles::reactivate_fleet_profile))
        .layer(auth_layer())
        .with_state(fleet_profiles::FleetHandlerState {
            directory: Arc::new(FleetDirectory::new(ctx.repos.clone())),
        });

    let badge_routes = Router::new()
        .route("/workers/{id}", get(badges::worker_badge))
        .route("/fleet/{id}", get(badges::fleet_badge))
        .layer(auth_layer())
        .with_state(badges::BadgeState {
            issuer: Arc::new(BadgeIssuer::new(
                ctx.repos.clone(),
                ctx.settings.clone(),
                ctx.clock.clone(),
            )),
        });

    let history_routes = Router::new()
        .route("/attendance/sessions", get(history::list_sessions))
        .route("/attendance/on-site", get(history::on_site_summary))
        .route("/fleet-access", get(history::list_fleet_access))
        .layer(auth_layer())
        .with_state(history::HistoryState {
            history: Arc::new(HistoryService::new(
                ctx.repos.clone(),
                ctx.settings.clone(),
                ctx.clock.clone(),
            )),
        });

    let settings_routes = Router::new()
        .route(
            "/",
            get(settings::get_settings).put(settings::update_settings),
        )
        .layer(auth_layer())
        .with_state(settings::SettingsState {
            settings: ctx.settings.clone(),
        });

    // Token checked by the handler from the query string
    let notification_routes = Router::new()
        .route("/ws", get(ws_notifications_handler))
        .with_state(NotificationState {
            event_bus: ctx.event_bus.clone(),
            jwt_config: ctx.jwt_config.clone(),
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db.clone(),
            repos: ctx.repos.clone(),
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: ctx.metrics.clone(),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        .nest("/api/v1/checkpoint", checkpoint_routes)
        .nest("/api/v1/workers", worker_routes)
        .nest("/api/v1/fleet-profiles", fleet_routes)
        .nest("/api/v1/badges", badge_routes)
        .nest("/api/v1/settings", settings_routes)
        .nest("/api/v1/notifications", notification_routes)
        .nest("/api/v1", history_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::create_event_bus;
    use crate::application::services::NewWorker;
    use crate::config::SiteConfig;
    use crate::domain::{SystemSettings, Worker, WorkerRole};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::SystemClock;

    struct TestApp {
        router: Router,
        admin: Worker,
        worker: Worker,
    }

    async fn test_app() -> TestApp {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let event_bus = create_event_bus();
        let settings = SettingsService::new(
            repos.clone(),
            SystemSettings::from(&SiteConfig::default()),
            event_bus.clone(),
        );

        let directory = WorkerDirectory::new(repos.clone());
        let admin = directory
            .create(NewWorker {
                full_name: "Ana Torres".into(),
                document_id: Some("ADM-1".into()),
                email: "ana@example.com".into(),
                pin: "9999".into(),
                role: WorkerRole::Admin,
                password: Some("admin12345".into()),
            })
            .await
            .unwrap();
        let worker = directory
            .create(NewWorker {
                full_name: "Pedro Quispe".into(),
                document_id: Some("DOC-1".into()),
                email: "pedro@example.com".into(),
                pin: "1234".into(),
                role: WorkerRole::Worker,
                password: None,
            })
            .await
            .unwrap();

        let router = create_api_router(ApiContext {
            repos,
            db: None,
            jwt_config: JwtConfig::default(),
            event_bus,
            settings,
            clock: Arc::new(SystemClock),
            metrics: metrics::detached_handle(),
        });
        TestApp {
            router,
            admin,
            worker,
        }
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(router: &Router) -> String {
        let (status, body) = send(
            router,
            json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                json!({"login": "ana@example.com", "password": "admin12345"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let app = test_app().await;
        let (status, _) = send(&app.router, get_request("/api/v1/workers", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_reports_in_memory_store() {
        let app = test_app().await;
        let (status, body) = send(&app.router, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"]["status"], "in_memory");
        assert_eq!(body["workers_on_site"], 0);
    }

    #[tokio::test]
    async fn badge_check_in_then_duplicate_is_rejected() {
        let app = test_app().await;
        let token = login(&app.router).await;

        let (status, badge) = send(
            &app.router,
            get_request(&format!("/api/v1/badges/workers/{}", app.worker.id), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", badge);
        let payload = badge["data"]["payload"].as_str().unwrap().to_string();

        let attempt = json!({
            "mode": "camera",
            "direction": "entry",
            "identifier": payload,
            "authorizer_pin": "9999",
            "latitude": 0.0,
            "longitude": 0.0
        });

        let (status, body) = send(
            &app.router,
            json_request("POST", "/api/v1/checkpoint/register", Some(&token), attempt.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["outcome"], "worker_checked_in");
        assert_eq!(body["data"]["message"], "ENTRADA REGISTRADA");
        assert_eq!(body["data"]["subject_id"], app.worker.id.as_str());
        assert_eq!(body["data"]["session"]["status"], "active");

        let (status, body) = send(
            &app.router,
            json_request("POST", "/api/v1/checkpoint/register", Some(&token), attempt),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "DUPLICATE_ENTRY");
        assert_eq!(body["reset"], "subject");

        let (status, body) = send(
            &app.router,
            get_request("/api/v1/attendance/on-site", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["workers_on_site"], 1);
        assert_eq!(body["data"]["workers"][0]["worker_name"], "Pedro Quispe");
    }

    #[tokio::test]
    async fn outside_geofence_is_forbidden() {
        let app = test_app().await;
        let token = login(&app.router).await;
        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                "/api/v1/checkpoint/register",
                Some(&token),
                json!({
                    "mode": "manual",
                    "direction": "entry",
                    "identifier": "DOC-1",
                    "subject_pin": "1234",
                    "authorizer_pin": "9999",
                    "latitude": 1.0,
                    "longitude": 1.0
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "GEOFENCE_VIOLATION");
        assert_eq!(body["reset"], "none");
    }

    #[tokio::test]
    async fn worker_role_limited_to_own_resources() {
        let app = test_app().await;
        let token = crate::infrastructure::crypto::jwt::create_token(
            &app.worker.id,
            &app.worker.email,
            "worker",
            &JwtConfig::default(),
        )
        .unwrap();

        let (status, _) = send(&app.router, get_request("/api/v1/workers", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Own badge is allowed, someone else's is not
        let (status, _) = send(
            &app.router,
            get_request(&format!("/api/v1/badges/workers/{}", app.worker.id), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            &app.router,
            get_request(&format!("/api/v1/badges/workers/{}", app.admin.id), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn settings_update_is_admin_only_and_applies() {
        let app = test_app().await;
        let token = login(&app.router).await;
        let (status, body) = send(
            &app.router,
            json_request(
                "PUT",
                "/api/v1/settings",
                Some(&token),
                json!({"values": {"geofence_radius_m": 250, "company_name": "Acme"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["geofence_radius_m"], 250.0);
        assert_eq!(body["data"]["company_name"], "Acme");

        let (status, body) = send(
            &app.router,
            json_request(
                "PUT",
                "/api/v1/settings",
                Some(&token),
                json!({"values": {"no_such_key": 1}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    }
}
