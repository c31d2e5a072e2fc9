//! Locomotive tracker for the ISOR railway portal.
//!
//! ISOR has no API: this crate logs in like a browser, submits query forms
//! one at a time, and scrapes locomotive positions and train routes out of
//! the returned pages.

pub mod config;
pub mod domain;
pub mod extract;
pub mod portal;
pub mod tracker;
pub mod web;
