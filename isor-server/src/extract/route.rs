//! Route extraction from a train query page.

use tracing::debug;

use crate::domain::RouteText;

use super::patterns::ROUTE_BLOCK;

/// Extract the route block of a train page.
///
/// `status` is the HTTP status the page was served with; anything but
/// success means the page is not worth parsing.
pub fn extract_route(status: u16, html: &str) -> RouteText {
    if !(200..300).contains(&status) {
        debug!(status, "train page not available");
        return RouteText::Unavailable;
    }

    match ROUTE_BLOCK.captures(html).and_then(|c| c.get(1)) {
        Some(inner) => RouteText::Route(inner.as_str().to_string()),
        None => {
            debug!("train page has no route block");
            RouteText::Unparsable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_inner_block() {
        let html = "<html><pre>\n Praha hl.n.   10:15\n Kolín   10:58\n</pre></html>";
        assert_eq!(
            extract_route(200, html),
            RouteText::Route("\n Praha hl.n.   10:15\n Kolín   10:58\n".into())
        );
    }

    #[test]
    fn spans_to_last_closing_tag() {
        let html = "<pre>a</pre> gap <pre>b</pre>";
        assert_eq!(
            extract_route(200, html),
            RouteText::Route("a</pre> gap <pre>b".into())
        );
    }

    #[test]
    fn missing_block_is_unparsable() {
        assert_eq!(extract_route(200, "<html>nic</html>"), RouteText::Unparsable);
    }

    #[test]
    fn error_status_is_unavailable() {
        assert_eq!(
            extract_route(500, "<pre>stale</pre>"),
            RouteText::Unavailable
        );
    }
}
