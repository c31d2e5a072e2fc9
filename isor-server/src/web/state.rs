//! Application state for the web layer.

use std::sync::Arc;

use crate::tracker::Tracker;

use super::auth::BasicAuth;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Rate-limited portal queries
    pub tracker: Arc<Tracker>,

    /// Credentials required on the query routes
    pub auth: Arc<BasicAuth>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(tracker: Tracker, auth: BasicAuth) -> Self {
        Self {
            tracker: Arc::new(tracker),
            auth: Arc::new(auth),
        }
    }
}
