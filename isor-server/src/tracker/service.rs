//! Rate-limited portal queries.
//!
//! Combines the cooldowns, the portal client and the extraction pipeline
//! into the three queries the application offers: one locomotive, one
//! train, and the whole tracked fleet.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::{LocoNumber, PaintSchemes, PositionRecord, RouteText};
use crate::extract::{extract_position, extract_route};
use crate::portal::{PendingRequest, PortalClient, PortalError};

use super::throttle::{Acquire, QueryClass, RateLimitConfig, RateLimiter};

/// Result of a rate-limited query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome<T> {
    /// The query ran
    Ready(T),
    /// The query was refused by its cooldown; nothing was sent
    Denied { retry_after: Duration },
}

impl<T> QueryOutcome<T> {
    /// Whole seconds to wait before retrying, rounded up.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            QueryOutcome::Ready(_) => None,
            QueryOutcome::Denied { retry_after } => {
                let secs = retry_after.as_secs();
                Some(if retry_after.subsec_nanos() > 0 { secs + 1 } else { secs })
            }
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            QueryOutcome::Ready(value) => Some(value),
            QueryOutcome::Denied { .. } => None,
        }
    }
}

/// Queries the portal on behalf of the web layer.
#[derive(Debug, Clone)]
pub struct Tracker {
    portal: PortalClient,
    limiter: Arc<RateLimiter>,
    paint: Arc<PaintSchemes>,
}

impl Tracker {
    pub fn new(portal: PortalClient, limits: &RateLimitConfig, paint: PaintSchemes) -> Self {
        Self {
            portal,
            limiter: Arc::new(RateLimiter::new(limits)),
            paint: Arc::new(paint),
        }
    }

    /// Cooldown of a query class.
    pub fn interval(&self, class: QueryClass) -> Duration {
        self.limiter.interval(class)
    }

    /// Current position of one locomotive.
    pub async fn locomotive(
        &self,
        loco: &LocoNumber,
        bypass: bool,
    ) -> Result<QueryOutcome<PositionRecord>, PortalError> {
        if let Acquire::Denied { remaining } = self.limiter.try_acquire(QueryClass::Single, bypass)
        {
            return Ok(QueryOutcome::Denied {
                retry_after: remaining,
            });
        }

        info!(%loco, bypass, "querying locomotive");
        self.position(loco).await.map(QueryOutcome::Ready)
    }

    /// Route of one train.
    ///
    /// Shares its cooldown with locomotive queries.
    pub async fn train(
        &self,
        train_number: &str,
        bypass: bool,
    ) -> Result<QueryOutcome<RouteText>, PortalError> {
        if let Acquire::Denied { remaining } = self.limiter.try_acquire(QueryClass::Single, bypass)
        {
            return Ok(QueryOutcome::Denied {
                retry_after: remaining,
            });
        }

        info!(train = train_number, bypass, "querying train");
        let route = match self.portal.submit(PendingRequest::train(train_number)).await {
            Ok(response) => extract_route(response.status, &response.body),
            Err(e) if e.is_transport() => {
                warn!(train = train_number, error = %e, "train query failed");
                RouteText::Unavailable
            }
            Err(e) => return Err(e),
        };

        Ok(QueryOutcome::Ready(route))
    }

    /// Positions of every locomotive in `fleet`, in order.
    pub async fn fleet(
        &self,
        fleet: &[LocoNumber],
        bypass: bool,
    ) -> Result<QueryOutcome<Vec<PositionRecord>>, PortalError> {
        if let Acquire::Denied { remaining } = self.limiter.try_acquire(QueryClass::Bulk, bypass) {
            return Ok(QueryOutcome::Denied {
                retry_after: remaining,
            });
        }

        info!(count = fleet.len(), bypass, "refreshing fleet");
        let mut records = Vec::with_capacity(fleet.len());
        for loco in fleet {
            records.push(self.position(loco).await?);
        }

        Ok(QueryOutcome::Ready(records))
    }

    /// Query and scrape one locomotive, without any cooldown.
    ///
    /// Transport failures and error pages yield a record with identity
    /// only; rejected logins and timeouts are returned as errors.
    async fn position(&self, loco: &LocoNumber) -> Result<PositionRecord, PortalError> {
        let color = self.paint.color_of(loco.short()).map(str::to_string);

        match self.portal.submit(PendingRequest::locomotive(loco)).await {
            Ok(response) if response.is_success() => {
                let scraped = extract_position(&response.body);
                Ok(PositionRecord::new(loco, color, scraped))
            }
            Ok(response) => {
                warn!(%loco, status = response.status, "locomotive page not available");
                Ok(PositionRecord::unknown(loco, color))
            }
            Err(e) if e.is_transport() => {
                warn!(%loco, error = %e, "locomotive query failed");
                Ok(PositionRecord::unknown(loco, color))
            }
            Err(e) => Err(e),
        }
    }
}
