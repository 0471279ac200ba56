//! Checkpoint DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::checkpoint::{
    CargoDeclaration, Direction, InputMode, RegistrationOutcome, RegistrationReceipt,
    RegistrationRequest,
};
use crate::domain::{GeoPoint, GeofenceCheck};
use crate::interfaces::http::modules::history::{AttendanceSessionDto, FleetAccessRecordDto};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    /// manual | scanner | camera
    #[schema(value_type = String, example = "scanner")]
    pub mode: InputMode,
    /// entry | exit
    #[schema(value_type = String, example = "entry")]
    pub direction: Direction,
    /// Badge payload (scanner/camera) or document id / email (manual)
    #[validate(length(min = 1, max = 512))]
    pub identifier: String,
    /// Subject's own PIN, required in manual mode
    pub subject_pin: Option<String>,
    /// PIN of the logged-in operator co-signing the attempt
    #[validate(length(min = 1))]
    pub authorizer_pin: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Fleet dispatch only
    pub cargo_quantity: Option<i32>,
    /// Fleet dispatch only
    #[validate(length(max = 500))]
    pub observation: Option<String>,
}

impl RegisterRequestDto {
    pub fn into_request(self) -> RegistrationRequest {
        let cargo = if self.cargo_quantity.is_some() || self.observation.is_some() {
            Some(CargoDeclaration {
                cargo_quantity: self.cargo_quantity,
                observation: self.observation,
            })
        } else {
            None
        };
        RegistrationRequest {
            mode: self.mode,
            direction: self.direction,
            identifier: self.identifier,
            subject_pin: self.subject_pin,
            authorizer_pin: self.authorizer_pin,
            position: GeoPoint::new(self.latitude, self.longitude),
            cargo,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeofenceProbeRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeofenceCheckDto {
    pub distance_m: f64,
    pub radius_m: f64,
    pub inside: bool,
}

impl From<GeofenceCheck> for GeofenceCheckDto {
    fn from(c: GeofenceCheck) -> Self {
        Self {
            distance_m: c.distance_m,
            radius_m: c.radius_m,
            inside: c.inside,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    /// worker_checked_in | worker_checked_out | fleet_arrived |
    /// fleet_dispatched | cargo_input_required
    pub outcome: String,
    /// Text shown on the operator's confirmation screen
    pub message: String,
    /// worker | fleet
    pub subject_kind: String,
    pub subject_id: String,
    pub display_name: String,
    pub geofence: GeofenceCheckDto,
    pub signature: String,
    pub session: Option<AttendanceSessionDto>,
    pub fleet_record: Option<FleetAccessRecordDto>,
    /// Resubmit the exit with `cargo_quantity` to complete the dispatch
    pub requires_cargo: bool,
}

pub fn outcome_message(outcome: &RegistrationOutcome) -> &'static str {
    match outcome {
        RegistrationOutcome::WorkerCheckedIn(_) => "ENTRADA REGISTRADA",
        RegistrationOutcome::WorkerCheckedOut(_) => "SALIDA REGISTRADA",
        RegistrationOutcome::FleetArrived(_) => "INGRESO DE FLOTA REGISTRADO",
        RegistrationOutcome::FleetDispatched(_) => "DESPACHO DE FLOTA REGISTRADO",
        RegistrationOutcome::CargoInputRequired(_) => "INGRESE LA CANTIDAD DE CARGA",
    }
}

impl From<RegistrationReceipt> for RegistrationResponse {
    fn from(r: RegistrationReceipt) -> Self {
        let outcome = r.outcome.as_str().to_string();
        let message = outcome_message(&r.outcome).to_string();
        let requires_cargo = matches!(r.outcome, RegistrationOutcome::CargoInputRequired(_));
        let (session, fleet_record) = match r.outcome {
            RegistrationOutcome::WorkerCheckedIn(s) | RegistrationOutcome::WorkerCheckedOut(s) => {
                (Some(s.into()), None)
            }
            RegistrationOutcome::FleetArrived(rec)
            | RegistrationOutcome::FleetDispatched(rec)
            | RegistrationOutcome::CargoInputRequired(rec) => (None, Some(rec.into())),
        };
        Self {
            outcome,
            message,
            subject_kind: r.subject_kind.as_str().to_string(),
            subject_id: r.subject_id,
            display_name: r.display_name,
            geofence: r.geofence.into(),
            signature: r.signature.to_string(),
            session,
            fleet_record,
            requires_cargo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(json: &str) -> RegisterRequestDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn cargo_only_when_supplied() {
        let plain = dto(
            r#"{"mode":"camera","direction":"exit","identifier":"x","authorizer_pin":"1",
                "latitude":1.0,"longitude":2.0}"#,
        );
        assert!(plain.into_request().cargo.is_none());

        let with_cargo = dto(
            r#"{"mode":"scanner","direction":"exit","identifier":"x","authorizer_pin":"1",
                "latitude":1.0,"longitude":2.0,"cargo_quantity":12}"#,
        )
        .into_request();
        assert_eq!(with_cargo.cargo.unwrap().cargo_quantity, Some(12));
        assert_eq!(with_cargo.position, GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let parsed: Result<RegisterRequestDto, _> = serde_json::from_str(
            r#"{"mode":"nfc","direction":"entry","identifier":"x","authorizer_pin":"1",
                "latitude":0.0,"longitude":0.0}"#,
        );
        assert!(parsed.is_err());
    }
}
