//! Bearer-token verification
//!
//! Account registration and login live in the identity provider, outside
//! this repository. The API only needs to resolve a bearer token to a user
//! id.

mod jwt;

pub use jwt::{Claims, TokenVerifier};
