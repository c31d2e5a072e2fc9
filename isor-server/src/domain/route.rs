//! Route text for a train query.

use std::fmt;

use serde::Serialize;

/// Outcome of extracting a train's route from the portal.
///
/// The route itself is an opaque pre-formatted fragment; no further
/// structure is imposed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum RouteText {
    /// Inner content of the portal's `<pre>` block.
    Route(String),
    /// The page was fetched but contained no route block.
    Unparsable,
    /// The page could not be fetched.
    Unavailable,
}

impl RouteText {
    /// The route fragment, or the failure message shown to users.
    pub fn as_text(&self) -> &str {
        match self {
            RouteText::Route(text) => text,
            RouteText::Unparsable => "Couldn't parse data",
            RouteText::Unavailable => "Couldn't get data",
        }
    }

    pub fn is_route(&self) -> bool {
        matches!(self, RouteText::Route(_))
    }
}

impl fmt::Display for RouteText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}
