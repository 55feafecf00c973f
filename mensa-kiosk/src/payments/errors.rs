//! Payment authentication error types

use thiserror::Error;

/// Errors raised while obtaining a bearer token from the identity endpoint.
///
/// There is no retry policy here; callers treat any of these as fatal for the
/// in-flight payment operation and surface it to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport-level failure talking to the token endpoint
    #[error("token request failed: {0}")]
    Network(String),

    /// The token endpoint did not answer within the client timeout
    #[error("token endpoint timed out")]
    Timeout,

    /// The token endpoint answered with a non-success status
    #[error("token endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    /// The response decoded but carried no usable access token
    #[error("token response missing access_token")]
    MissingAccessToken,

    /// The response body was not the expected JSON shape
    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::Network(err.to_string())
        }
    }
}

/// Result type alias for payment authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
