//! JSON body extractor that also runs `validator` rules.
//!
//! Malformed bodies answer 400 `INVALID_JSON`; rule violations answer 422
//! `VALIDATION_ERROR` with a `field: message` list in the envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiResponse;

pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(validator::ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::JsonError(rejection) => (
                StatusCode::BAD_REQUEST,
                "INVALID_JSON",
                format!("Invalid JSON: {}", rejection.body_text()),
            ),
            Self::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                describe(&errors),
            ),
        };
        let mut body = ApiResponse::<()>::error(message);
        body.code = Some(code.to_string());
        (status, Json(body)).into_response()
    }
}

/// `field: message` pairs, sorted by field so responses are stable
fn describe(errors: &validator::ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => format!("{}: {}", field, m),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    lines.sort();
    if lines.is_empty() {
        "Validation failed".to_string()
    } else {
        lines.join("; ")
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}
