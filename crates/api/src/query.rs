//! Shared query parameter types for API handlers.

use serde::Deserialize;
use vowline_core::types::Timestamp;

/// Largest page returned by list endpoints that accept `?limit=`.
pub const MAX_LIMIT: i64 = 500;
pub const DEFAULT_LIMIT: i64 = 200;

/// `?limit=&since=` for append-only feeds such as tracking events.
#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub limit: Option<i64>,
    pub since: Option<Timestamp>,
}

impl FeedParams {
    pub fn clamped_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// `?template_type=` filter for message templates.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateTypeParams {
    pub template_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(FeedParams::default().clamped_limit(), DEFAULT_LIMIT);
        let huge = FeedParams {
            limit: Some(10_000),
            since: None,
        };
        assert_eq!(huge.clamped_limit(), MAX_LIMIT);
        let zero = FeedParams {
            limit: Some(0),
            since: None,
        };
        assert_eq!(zero.clamped_limit(), 1);
    }
}
