//! Settings service: effective settings and admin edits

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::events::{Event, SettingsUpdatedEvent, SharedEventBus};
use crate::domain::{DomainError, DomainResult, RepositoryProvider, SettingKey, SystemSettings};

#[derive(Clone)]
pub struct SettingsService {
    repos: Arc<dyn RepositoryProvider>,
    defaults: SystemSettings,
    event_bus: SharedEventBus,
}

impl SettingsService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        defaults: SystemSettings,
        event_bus: SharedEventBus,
    ) -> Self {
        Self {
            repos,
            defaults,
            event_bus,
        }
    }

    /// Defaults overlaid with stored rows. Read fresh on every call so
    /// admin edits take effect on the next registration attempt.
    pub async fn current(&self) -> DomainResult<SystemSettings> {
        let stored = self.repos.settings().get_all().await?;
        Ok(self.defaults.clone().overlay(&stored))
    }

    /// Validate every change first, then persist. Nothing is written if
    /// any key or value is rejected.
    pub async fn update(
        &self,
        changes: Vec<(String, String)>,
        updated_by: &str,
    ) -> DomainResult<SystemSettings> {
        if changes.is_empty() {
            return Err(DomainError::Validation("No settings to update".into()));
        }

        let mut settings = self.current().await?;
        let mut parsed = Vec::with_capacity(changes.len());
        for (name, value) in changes {
            let key = SettingKey::parse(&name)
                .ok_or_else(|| DomainError::Validation(format!("Unknown setting: {}", name)))?;
            settings.apply(key, &value)?;
            parsed.push(key);
        }

        for key in &parsed {
            self.repos
                .settings()
                .set(key.as_str(), &settings.value_of(*key))
                .await?;
        }

        let keys: Vec<String> = parsed.iter().map(|k| k.as_str().to_string()).collect();
        info!(updated_by, keys = ?keys, "Settings updated");

        self.event_bus.publish(Event::SettingsUpdated(SettingsUpdatedEvent {
            keys,
            updated_by: updated_by.to_string(),
            timestamp: Utc::now(),
        }));

        Ok(settings)
    }
}
