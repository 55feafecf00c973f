//! Payment gateway authentication
//!
//! The kiosk authenticates against the payment provider's identity endpoint
//! with the client-credentials grant and caches the resulting bearer token so
//! checkout operations do not re-authenticate on every call.

pub mod errors;
pub mod token_cache;

pub use errors::{AuthError, AuthResult};
pub use token_cache::{HttpTokenSource, IssuedToken, TokenCache, TokenSource};
