pub mod auth;
pub mod badges;
pub mod checkpoint;
pub mod fleet_profiles;
pub mod health;
pub mod history;
pub mod metrics;
pub mod request_id;
pub mod settings;
pub mod workers;
