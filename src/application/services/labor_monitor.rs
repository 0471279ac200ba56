//! Labor Limit Monitor
//!
//! Periodically looks for open attendance sessions that exceed the
//! configured maximum labor hours and announces each one once.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use log::{debug, info, warn};
use tokio::sync::RwLock;

use crate::application::events::{Event, LaborLimitExceededEvent, SharedEventBus};
use crate::application::settings::SettingsService;
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::{SharedClock, ShutdownSignal};

pub struct LaborMonitor {
    repos: Arc<dyn RepositoryProvider>,
    settings: SettingsService,
    event_bus: SharedEventBus,
    clock: SharedClock,
    check_interval_secs: u64,
    /// Sessions already announced
    notified: Arc<DashSet<String>>,
    running: Arc<RwLock<bool>>,
}

impl LaborMonitor {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        settings: SettingsService,
        event_bus: SharedEventBus,
        clock: SharedClock,
        check_interval_secs: u64,
    ) -> Self {
        Self {
            repos,
            settings,
            event_bus,
            clock,
            check_interval_secs: check_interval_secs.max(1),
            notified: Arc::new(DashSet::new()),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start the monitor background task
    pub fn start(self: Arc<Self>, shutdown: ShutdownSignal) {
        tokio::spawn(async move {
            *self.running.write().await = true;
            info!(
                "⏱️ Labor monitor started (check interval: {}s)",
                self.check_interval_secs
            );

            let mut interval = tokio::time::interval(Duration::from_secs(self.check_interval_secs));

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = self.check_once().await {
                            warn!("Labor limit check error: {}", e);
                        }
                    }
                    _ = shutdown.wait() => {
                        info!("⏱️ Labor monitor shutting down");
                        break;
                    }
                }
            }

            *self.running.write().await = false;
            info!("⏱️ Labor monitor stopped");
        });
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// One pass; returns the number of newly announced sessions.
    pub async fn check_once(&self) -> DomainResult<usize> {
        let now = self.clock.now();
        let max_labor_hours = self.settings.current().await?.max_labor_hours;
        let open = self.repos.attendance().list_open().await?;

        // forget sessions that were closed since the last pass
        self.notified
            .retain(|id| open.iter().any(|s| &s.id == id));

        let mut announced = 0;
        for session in open {
            let hours_elapsed = session.running_hours(now);
            if hours_elapsed <= max_labor_hours || self.notified.contains(&session.id) {
                continue;
            }

            let full_name = self
                .repos
                .workers()
                .find_by_id(&session.worker_id)
                .await?
                .map(|w| w.full_name)
                .unwrap_or_default();

            warn!(
                "Worker {} ({}) exceeded {}h on site: {:.2}h",
                full_name, session.worker_id, max_labor_hours, hours_elapsed
            );
            self.notified.insert(session.id.clone());
            self.event_bus
                .publish(Event::LaborLimitExceeded(LaborLimitExceededEvent {
                    worker_id: session.worker_id.clone(),
                    full_name,
                    session_id: session.id.clone(),
                    entry_at: session.entry_at,
                    hours_elapsed,
                    max_labor_hours,
                    timestamp: now,
                }));
            announced += 1;
        }

        debug!("Labor limit check done: {} new", announced);
        Ok(announced)
    }
}
