//! ISOR portal client.
//!
//! The portal has no API: it is driven like a browser, by logging in
//! with a form, keeping the session cookie and POSTing query forms.
//!
//! Key characteristics:
//! - One login session is shared by all callers
//! - Requests are sent one at a time, at least 0.5 s apart
//! - An expired session shows up as a redirect to the login page and is
//!   renewed transparently before the next request

mod client;
mod error;
mod request;
mod session;
mod worker;

pub use client::{PortalClient, PortalConfig};
pub use error::{AuthError, PortalError};
pub use request::{DEFAULT_BASE_URL, Endpoint, PendingRequest, PortalResponse};
pub use session::Credentials;
