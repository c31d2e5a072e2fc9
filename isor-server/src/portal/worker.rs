//! The request serializer.
//!
//! All traffic to the portal goes through one task that takes requests
//! off a FIFO queue and sends them one at a time, never closer together
//! than the configured minimum spacing. The task owns the login session.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info, warn};

use super::error::PortalError;
use super::request::{PendingRequest, PortalResponse};
use super::session::SessionManager;

/// A queued request and the channel its response is delivered on.
pub(crate) struct Job {
    pub(crate) request: PendingRequest,
    pub(crate) reply: oneshot::Sender<Result<PortalResponse, PortalError>>,
}

/// Single consumer of the request queue.
pub(crate) struct RequestSerializer {
    session: SessionManager,
    jobs: mpsc::Receiver<Job>,
    min_spacing: Duration,
    last_dispatch: Option<Instant>,
}

impl RequestSerializer {
    pub(crate) fn new(
        session: SessionManager,
        jobs: mpsc::Receiver<Job>,
        min_spacing: Duration,
    ) -> Self {
        Self {
            session,
            jobs,
            min_spacing,
            last_dispatch: None,
        }
    }

    /// Process requests until every client handle is dropped.
    pub(crate) async fn run(mut self) {
        info!(min_spacing_ms = self.min_spacing.as_millis(), "request serializer started");

        while let Some(Job { request, reply }) = self.jobs.recv().await {
            if let Some(last) = self.last_dispatch {
                sleep_until(last + self.min_spacing).await;
            }

            if reply.is_closed() {
                debug!(request_id = %request.id(), "caller gave up while queued, dropping request");
                continue;
            }

            let id = request.id();
            let result = self.dispatch(request).await;
            self.last_dispatch = Some(Instant::now());

            if let Err(e) = &result {
                warn!(request_id = %id, error = %e, "portal request failed");
            }

            if reply.send(result).is_err() {
                debug!(request_id = %id, "caller stopped waiting before the response arrived");
            }
        }

        info!("all portal clients dropped, request serializer stopping");
    }

    async fn dispatch(&mut self, request: PendingRequest) -> Result<PortalResponse, PortalError> {
        let endpoint = request.endpoint();
        debug!(request_id = %request.id(), ?endpoint, "dispatching portal request");

        let idle = self
            .last_dispatch
            .map_or(Duration::ZERO, |last| last.elapsed());
        if self.session.ensure_valid(endpoint, idle).await? {
            // the probe (and any re-login) counts as a dispatch
            sleep(self.min_spacing).await;
        }

        let response = self
            .session
            .http()
            .post(self.session.url(endpoint).clone())
            .form(request.form())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(request_id = %request.id(), status, bytes = body.len(), "portal request handled");
        Ok(PortalResponse {
            id: request.id(),
            status,
            body,
        })
    }
}
