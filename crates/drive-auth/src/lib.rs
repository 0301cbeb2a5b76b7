//! # drive-auth
//!
//! Token issuance/validation and password hashing. The hierarchy engine
//! trusts the identity resolved here for all owner scoping.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
