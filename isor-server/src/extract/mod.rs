//! HTML extraction for portal pages.
//!
//! The portal has no API; its pages are scraped with a chain of
//! patterns that degrade to partial results instead of failing.

mod patterns;
mod position;
mod route;

pub use position::{extract_position, select_reservation};
pub use route::extract_route;
