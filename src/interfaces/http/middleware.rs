//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::ErrorKind;

use super::common::{ApiError, ApiResponse};
use crate::domain::WorkerRole;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    UnknownRole,
}

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Operator identity taken from a verified JWT
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub worker_id: String,
    pub email: String,
    pub role: WorkerRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            role: WorkerRole::parse(&claims.role)?,
            worker_id: claims.sub,
            email: claims.email,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Supervisors and admins
    pub fn is_operator(&self) -> bool {
        matches!(self.role, WorkerRole::Supervisor | WorkerRole::Admin)
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator role required"))
        }
    }

    pub fn require_operator(&self) -> Result<(), ApiError> {
        if self.is_operator() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Supervisor or administrator role required"))
        }
    }

    /// The worker themself, or an admin
    pub fn require_self_or_admin(&self, worker_id: &str) -> Result<(), ApiError> {
        if self.is_admin() || self.worker_id == worker_id {
            Ok(())
        } else {
            Err(ApiError::forbidden("Not allowed to access another worker's data"))
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim)
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    let claims = match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => claims,
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            return auth_error_response(AuthError::ExpiredToken)
        }
        Err(_) => return auth_error_response(AuthError::InvalidToken),
    };
    let Some(user) = AuthenticatedUser::from_claims(claims) else {
        return auth_error_response(AuthError::UnknownRole);
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid authentication token",
        AuthError::ExpiredToken => "Token has expired",
        AuthError::UnknownRole => "Token carries an unknown role",
    };

    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}
