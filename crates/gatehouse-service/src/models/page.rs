//! Pagination parameters for listing operations.

use gatehouse_store::PageQuery;
use serde::Deserialize;
use uuid::Uuid;

/// Caller-supplied pagination: resume after `marker`, return at most
/// `limit` items. An absent limit falls back to the configured default.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
    /// Resume listing after this id.
    pub marker: Option<Uuid>,
    /// Caller override for the page size.
    pub limit: Option<usize>,
}

impl Page {
    /// Resolve against the configured default page size.
    #[must_use]
    pub fn query(&self, default_limit: usize) -> PageQuery {
        PageQuery {
            marker: self.marker,
            limit: self.limit.unwrap_or(default_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limit_comes_from_config() {
        let page = Page::default();
        assert_eq!(page.query(25).limit, 25);
        assert!(page.query(25).marker.is_none());
    }

    #[test]
    fn caller_override_wins() {
        let page = Page {
            marker: Some(Uuid::new_v4()),
            limit: Some(5),
        };
        let query = page.query(25);
        assert_eq!(query.limit, 5);
        assert!(query.marker.is_some());
    }
}
