//! Domain types for the locomotive tracker.
//!
//! Identifiers are validated at construction time; scraped records are
//! immutable values built once per portal query.

mod error;
mod locomotive;
mod paint;
mod record;
mod route;

pub use error::DomainError;
pub use locomotive::LocoNumber;
pub use paint::PaintSchemes;
pub use record::{
    NO_TRAIN, PORTAL_TIME_FORMAT, PORTAL_TIME_ZONE, PositionRecord, ScrapedPosition, portal_time,
};
pub use route::RouteText;
