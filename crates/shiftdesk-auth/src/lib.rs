//! Caller identity for shiftdesk: session token claims and validation

pub mod jwt;

pub use jwt::{JwtClaims, JwtError, JwtValidator, SESSION_TOKEN_TYPE};

// Re-export useful types
pub use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
