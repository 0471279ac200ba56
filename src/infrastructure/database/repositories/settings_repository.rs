//! SeaORM implementation of SettingsRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use super::db_err;
use crate::domain::{DomainResult, SettingsRepository};
use crate::infrastructure::database::entities::system_setting;

pub struct SeaOrmSettingsRepository {
    db: DatabaseConnection,
}

impl SeaOrmSettingsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn get_all(&self) -> DomainResult<HashMap<String, String>> {
        let rows = system_setting::Entity::find()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|m| (m.key, m.value)).collect())
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        debug!("Saving setting {} = {}", key, value);
        let model = system_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(Utc::now()),
        };
        system_setting::Entity::insert(model)
            .on_conflict(
                OnConflict::column(system_setting::Column::Key)
                    .update_columns([system_setting::Column::Value, system_setting::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::repositories::test_support::test_db;

    #[tokio::test]
    async fn set_upserts() {
        let repo = SeaOrmSettingsRepository::new(test_db().await);
        assert!(repo.get_all().await.unwrap().is_empty());

        repo.set("geofence_radius_m", "150").await.unwrap();
        repo.set("geofence_radius_m", "200").await.unwrap();
        repo.set("company_name", "Acme").await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["geofence_radius_m"], "200");
    }
}
