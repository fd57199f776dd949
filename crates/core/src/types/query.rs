//! Product list query parameters.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 8;

/// Parameters of a product list request.
///
/// Two queries with equal fields address the same cached page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u32,
    /// Gender filter; empty means every category.
    pub gender: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            gender: String::new(),
        }
    }
}

impl ListQuery {
    /// Build a query, filling the defaults for any `None`.
    #[must_use]
    pub fn new(limit: Option<u32>, offset: Option<u32>, gender: Option<&str>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            offset: offset.unwrap_or(0),
            gender: gender.unwrap_or_default().to_string(),
        }
    }

    /// Query string pairs for the list endpoint.
    #[must_use]
    pub fn to_query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            ("gender", self.gender.clone()),
        ]
    }
}

impl std::fmt::Display for ListQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.limit, self.offset, self.gender)
    }
}
