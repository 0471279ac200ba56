//! Token signing and secret hashing

pub mod jwt;
pub mod password;

pub use jwt::{create_token, verify_token, JwtConfig, TokenClaims};
pub use password::{hash_password, hash_pin, verify_password, verify_pin};
