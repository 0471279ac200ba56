//! Server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database init and migrations,
//! bootstrap administrator, labor monitor, REST API, metrics and graceful
//! shutdown.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::services::NewWorker;
use crate::application::{LaborMonitor, SettingsService, WorkerDirectory};
use crate::config::AppConfig;
use crate::domain::{RepositoryProvider, SystemSettings, WorkerRole};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::modules::metrics;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};
use crate::shared::{InfraError, SharedClock, SystemClock};
use crate::{
    create_api_router, create_event_bus, init_database, run_migrations, ApiContext,
    DatabaseConfig, SeaOrmRepositoryProvider, SharedEventBus,
};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true)
    pub auto_migrate: bool,
    /// Create the `[admin]` account when no worker exists (default: true)
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running server.
///
/// ```rust,no_run
/// use gatekeeper::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the server:
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Connect to the database and run migrations
    /// 3. Create the default admin (if enabled and the worker table is empty)
    /// 4. Start the labor-limit monitor
    /// 5. Start the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, InfraError> {
        let app_cfg = opts.config;
        info!("Starting Gatekeeper...");

        let prometheus_handle =
            metrics::install_recorder().map_err(|e| InfraError::Metrics(e.to_string()))?;
        info!("📊 Prometheus metrics recorder ready");

        let db_config = DatabaseConfig::from(&app_cfg.database);
        info!("Database: {}", db_config.url);

        let jwt_config = JwtConfig::from(&app_cfg.security);
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        // ── Database ───────────────────────────────────────────
        let db = init_database(&db_config).await?;
        if opts.auto_migrate {
            info!("Running database migrations...");
            run_migrations(&db).await?;
            info!("Migrations completed");
        }

        // ── Repositories & Services ────────────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if opts.create_default_admin {
            create_default_admin(repos.clone(), &app_cfg).await;
        }

        let event_bus = create_event_bus();
        info!("🔔 Event bus initialized");

        let clock: SharedClock = Arc::new(SystemClock);
        let settings = SettingsService::new(
            repos.clone(),
            SystemSettings::from(&app_cfg.site),
            event_bus.clone(),
        );

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background tasks ───────────────────────────────────
        if app_cfg.monitor.enabled {
            let monitor = Arc::new(LaborMonitor::new(
                repos.clone(),
                settings.clone(),
                event_bus.clone(),
                clock.clone(),
                app_cfg.monitor.check_interval_secs,
            ));
            monitor.start(shutdown_signal.clone());
        } else {
            info!("Labor monitor disabled by configuration");
        }

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(ApiContext {
            repos: repos.clone(),
            db: Some(db.clone()),
            jwt_config,
            event_bus: event_bus.clone(),
            settings,
            clock,
            metrics: prometheus_handle,
        });

        let api_port = app_cfg.server.api_port;
        let api_addr = format!("{}:{}", app_cfg.server.api_host, api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Gatekeeper started.");

        Ok(Self {
            event_bus,
            repos,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Send the shutdown signal without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API server to stop, bounded by the shutdown timeout once
    /// the signal has fired, then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            mut api_task,
            ..
        } = self;

        let signal = shutdown.signal();
        let stopped_on_its_own = tokio::select! {
            result = &mut api_task => {
                if let Err(e) = result {
                    error!("REST API server task panicked: {}", e);
                }
                true
            }
            _ = signal.wait() => false,
        };

        if !stopped_on_its_own {
            let task = &mut api_task;
            let finished = shutdown
                .shutdown_with_cleanup(move || async move {
                    if let Err(e) = task.await {
                        error!("REST API server task panicked: {}", e);
                    }
                })
                .await;
            if !finished {
                api_task.abort();
            }
        }
        info!("REST API server stopped");

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Gatekeeper shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down Gatekeeper...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Create the `[admin]` account if the worker table is empty.
async fn create_default_admin(repos: Arc<dyn RepositoryProvider>, app_cfg: &AppConfig) {
    let count = match repos.workers().count().await {
        Ok(count) => count,
        Err(e) => {
            error!("Failed to count workers: {}", e);
            return;
        }
    };
    if count > 0 {
        return;
    }

    info!("Creating default admin...");
    let admin = &app_cfg.admin;
    let directory = WorkerDirectory::new(repos);
    match directory
        .create(NewWorker {
            full_name: admin.full_name.clone(),
            document_id: Some(admin.document_id.clone()),
            email: admin.email.clone(),
            pin: admin.pin.clone(),
            role: WorkerRole::Admin,
            password: Some(admin.password.clone()),
        })
        .await
    {
        Ok(worker) => {
            info!("Default admin created: {}", worker.email);
            info!("⚠️  Please change the admin password and PIN immediately!");
        }
        Err(e) => error!("Failed to create admin: {}", e),
    }
}

/// Initialize tracing from the application config. Call once at startup,
/// before [`ServerHandle::start`]. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    #[tokio::test]
    async fn default_admin_created_once() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let cfg = AppConfig::default();

        create_default_admin(repos.clone(), &cfg).await;
        create_default_admin(repos.clone(), &cfg).await;

        assert_eq!(repos.workers().count().await.unwrap(), 1);
        let admin = repos
            .workers()
            .find_by_email(&cfg.admin.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, WorkerRole::Admin);
        assert!(admin.password_hash.is_some());
    }
}
