//! Portal client façade.
//!
//! Callers submit requests from any task; the [`PortalClient`] queues them
//! for the request serializer and waits for the matching response.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::error::PortalError;
use super::request::{DEFAULT_BASE_URL, PendingRequest, PortalResponse, PortalUrls};
use super::session::{Credentials, SessionManager};
use super::worker::{Job, RequestSerializer};

/// Minimum spacing between two requests to the portal.
const DEFAULT_MIN_SPACING: Duration = Duration::from_millis(500);

/// How long a session may sit idle before it is probed again.
const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// How long a caller waits for its response.
const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of the request queue.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Configuration for the portal client.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Account used to log in
    pub credentials: Credentials,
    /// Base URL of the portal (defaults to production ISOR)
    pub base_url: String,
    /// Minimum spacing between outbound requests
    pub min_spacing: Duration,
    /// Idle time after which the session is re-checked
    pub session_max_age: Duration,
    /// How long `submit` waits for a response
    pub submit_timeout: Duration,
    /// Deadline for each individual HTTP exchange, in seconds
    pub timeout_secs: u64,
    /// Maximum number of queued requests
    pub queue_capacity: usize,
}

impl PortalConfig {
    /// Create a new config for the given account.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            base_url: DEFAULT_BASE_URL.to_string(),
            min_spacing: DEFAULT_MIN_SPACING,
            session_max_age: DEFAULT_SESSION_MAX_AGE,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            timeout_secs: 30,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the minimum spacing between requests.
    pub fn with_min_spacing(mut self, spacing: Duration) -> Self {
        self.min_spacing = spacing;
        self
    }

    /// Set the idle time after which the session is re-checked.
    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    /// Set how long callers wait for a response.
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Handle for submitting requests to the portal.
///
/// Cheap to clone; all clones feed the same serializer. The serializer
/// stops once the last handle is dropped.
#[derive(Debug, Clone)]
pub struct PortalClient {
    jobs: mpsc::Sender<Job>,
    submit_timeout: Duration,
}

impl PortalClient {
    /// Log in and start the request serializer.
    ///
    /// Fails if the portal rejects the credentials; no client exists
    /// without a valid session.
    pub async fn connect(config: PortalConfig) -> Result<Self, PortalError> {
        let urls = PortalUrls::new(&config.base_url)?;
        let session = SessionManager::login(
            config.credentials,
            urls,
            Duration::from_secs(config.timeout_secs),
            config.session_max_age,
        )
        .await?;

        let (jobs, queue) = mpsc::channel(config.queue_capacity);
        let serializer = RequestSerializer::new(session, queue, config.min_spacing);
        tokio::spawn(serializer.run());

        Ok(Self {
            jobs,
            submit_timeout: config.submit_timeout,
        })
    }

    /// Queue a request and wait for its response.
    ///
    /// The wait, including time spent in the queue, is bounded by the
    /// submit timeout.
    pub async fn submit(&self, request: PendingRequest) -> Result<PortalResponse, PortalError> {
        let id = request.id();
        let (reply, response) = oneshot::channel();

        let exchange = async {
            self.jobs
                .send(Job { request, reply })
                .await
                .map_err(|_| PortalError::WorkerStopped)?;
            response.await.map_err(|_| PortalError::WorkerStopped)?
        };

        let response = tokio::time::timeout(self.submit_timeout, exchange)
            .await
            .map_err(|_| PortalError::Timeout(self.submit_timeout))??;

        debug_assert_eq!(response.id, id);
        debug!(request_id = %id, status = response.status, "portal response received");
        Ok(response)
    }
}
