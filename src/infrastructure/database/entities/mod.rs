//! Database entities module

pub mod attendance_session;
pub mod fleet_access_record;
pub mod fleet_profile;
pub mod system_setting;
pub mod worker;

pub use attendance_session::Entity as AttendanceSession;
pub use fleet_access_record::Entity as FleetAccessRecord;
pub use fleet_profile::Entity as FleetProfile;
pub use system_setting::Entity as SystemSetting;
pub use worker::Entity as Worker;
