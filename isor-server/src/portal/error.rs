//! Portal client error types.

use std::time::Duration;

/// Login or re-login failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP request failed while logging in or probing the session
    #[error("HTTP error during login: {0}")]
    Http(#[from] reqwest::Error),

    /// The credential form was answered with an error status
    #[error("login form rejected with status {status}")]
    Status { status: u16 },

    /// The protected page redirected elsewhere (usually the login page)
    #[error("session not accepted: probing {expected} landed on {landed}")]
    Rejected { expected: String, landed: String },
}

/// Errors from submitting a request to the portal.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// The session could not be (re-)established
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The query itself failed in transport
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot address the portal endpoints
    #[error("invalid portal URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No response arrived within the submit timeout
    #[error("no response from portal within {0:?}")]
    Timeout(Duration),

    /// The request serializer is no longer running
    #[error("request serializer stopped")]
    WorkerStopped,
}

impl PortalError {
    /// Whether the error is a transport failure talking to the portal.
    ///
    /// Includes transport failures while probing or renewing the session.
    /// A rejected login and a timeout are not transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PortalError::Http(_) | PortalError::Auth(AuthError::Http(_))
        )
    }
}
