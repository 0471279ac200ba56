//! Fleet directory: admin CRUD over fleet profiles

use std::sync::Arc;

use tracing::info;

use super::worker_directory::hash_secret_pin;
use crate::domain::{
    DomainError, DomainResult, FleetProfile, FleetProfileFilter, FleetProfileUpdate,
    RepositoryProvider,
};
use crate::shared::{is_valid_document_id, PageRequest, PaginatedResult};

#[derive(Debug, Clone)]
pub struct NewFleetProfile {
    pub full_name: String,
    pub document_id: String,
    pub pin: String,
    pub fleet_name: String,
    pub driver_count: i32,
    pub route_count: i32,
}

pub struct FleetDirectory {
    repos: Arc<dyn RepositoryProvider>,
}

impl FleetDirectory {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, input: NewFleetProfile) -> DomainResult<FleetProfile> {
        let document_id = input.document_id.trim();
        if input.full_name.trim().is_empty() {
            return Err(DomainError::Validation("Full name is required".into()));
        }
        validate_document(document_id)?;
        validate_counts(Some(input.driver_count), Some(input.route_count))?;

        let mut profile = FleetProfile::new(
            input.full_name.trim(),
            document_id,
            hash_secret_pin(&input.pin)?,
            input.fleet_name.trim(),
        );
        profile.driver_count = input.driver_count;
        profile.route_count = input.route_count;

        self.repos.fleet_profiles().create(profile.clone()).await?;
        info!(fleet_profile_id = %profile.id, fleet = %profile.fleet_name, "Fleet profile created");
        Ok(profile)
    }

    pub async fn get(&self, id: &str) -> DomainResult<FleetProfile> {
        self.repos
            .fleet_profiles()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("FleetProfile", "id", id))
    }

    pub async fn list(
        &self,
        filter: FleetProfileFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetProfile>> {
        self.repos.fleet_profiles().list(filter, page).await
    }

    pub async fn update(&self, id: &str, update: FleetProfileUpdate) -> DomainResult<FleetProfile> {
        validate_counts(update.driver_count, update.route_count)?;
        if let Some(ref doc) = update.document_id {
            validate_document(doc)?;
        }
        if update.is_active == Some(false) {
            return self.deactivate(id).await;
        }

        let mut profile = self.get(id).await?;
        update.apply(&mut profile);
        self.repos.fleet_profiles().update(profile.clone()).await?;
        info!(fleet_profile_id = id, "Fleet profile updated");
        Ok(profile)
    }

    pub async fn set_pin(&self, id: &str, pin: &str) -> DomainResult<()> {
        let mut profile = self.get(id).await?;
        profile.secret_pin_hash = hash_secret_pin(pin)?;
        profile.updated_at = chrono::Utc::now();
        self.repos.fleet_profiles().update(profile).await?;
        info!(fleet_profile_id = id, "Fleet secret PIN changed");
        Ok(())
    }

    /// Refused while the fleet has an open access record.
    pub async fn deactivate(&self, id: &str) -> DomainResult<FleetProfile> {
        let mut profile = self.get(id).await?;
        if self
            .repos
            .fleet_access()
            .find_open_for_profile(id)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(
                "Fleet is on site; register the dispatch first".into(),
            ));
        }
        profile.is_active = false;
        profile.updated_at = chrono::Utc::now();
        self.repos.fleet_profiles().update(profile.clone()).await?;
        info!(fleet_profile_id = id, "Fleet profile deactivated");
        Ok(profile)
    }

    pub async fn reactivate(&self, id: &str) -> DomainResult<FleetProfile> {
        let mut profile = self.get(id).await?;
        profile.is_active = true;
        profile.updated_at = chrono::Utc::now();
        self.repos.fleet_profiles().update(profile.clone()).await?;
        Ok(profile)
    }
}

fn validate_document(document_id: &str) -> DomainResult<()> {
    if !is_valid_document_id(document_id) {
        return Err(DomainError::Validation(
            "Document id is required and cannot contain '|'".into(),
        ));
    }
    Ok(())
}

fn validate_counts(drivers: Option<i32>, routes: Option<i32>) -> DomainResult<()> {
    if drivers.unwrap_or(0) < 0 || routes.unwrap_or(0) < 0 {
        return Err(DomainError::Validation("Counts cannot be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FleetAccessRecord;
    use crate::infrastructure::crypto::verify_pin;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn input(doc: &str) -> NewFleetProfile {
        NewFleetProfile {
            full_name: "Luis Vera".into(),
            document_id: doc.into(),
            pin: "5555".into(),
            fleet_name: "Transportes Sur".into(),
            driver_count: 3,
            route_count: 2,
        }
    }

    #[tokio::test]
    async fn create_and_update() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let dir = FleetDirectory::new(repos);
        let p = dir.create(input("TR-1")).await.unwrap();
        assert!(verify_pin("5555", &p.secret_pin_hash));
        assert_eq!(p.driver_count, 3);

        let p = dir
            .update(
                &p.id,
                FleetProfileUpdate {
                    route_count: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(p.route_count, 5);

        assert!(dir
            .update(
                &p.id,
                FleetProfileUpdate {
                    driver_count: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .is_err());
    }

    #[tokio::test]
    async fn document_must_fit_in_a_badge() {
        let dir = FleetDirectory::new(Arc::new(InMemoryRepositoryProvider::new()));
        assert!(matches!(dir.create(input("TR|1")).await, Err(DomainError::Validation(_))));
        assert!(matches!(dir.create(input("   ")).await, Err(DomainError::Validation(_))));

        let p = dir.create(input("TR-1")).await.unwrap();
        let err = dir
            .update(
                &p.id,
                FleetProfileUpdate {
                    document_id: Some("F|TR-1".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn document_is_unique() {
        let dir = FleetDirectory::new(Arc::new(InMemoryRepositoryProvider::new()));
        dir.create(input("TR-1")).await.unwrap();
        assert!(matches!(dir.create(input("TR-1")).await, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn deactivate_refused_while_on_site() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let dir = FleetDirectory::new(repos.clone());
        let p = dir.create(input("TR-1")).await.unwrap();
        repos
            .fleet_access()
            .open_record(FleetAccessRecord::arrive(&p.id, chrono::Utc::now(), "s"))
            .await
            .unwrap();
        assert!(matches!(dir.deactivate(&p.id).await, Err(DomainError::Conflict(_))));
    }
}
