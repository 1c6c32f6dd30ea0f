//! Pagination of note listings

/// Default page when none (or nonsense) is requested
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size when none (or nonsense) is requested
pub const DEFAULT_LIMIT: u32 = 10;

/// A requested page of results
///
/// `page` is 1-based, `limit` is the page size, both are always at least 1
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Create a pagination, clamping both values to at least 1
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Create a pagination from raw query parameters
    ///
    /// Query parameters arrive as strings; absent, non-numeric, or
    /// non-positive values fall back to the defaults
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page, DEFAULT_PAGE),
            limit: parse_positive(limit, DEFAULT_LIMIT),
        }
    }

    /// The requested page, 1-based
    pub fn page(&self) -> u32 {
        self.page
    }

    /// The requested page size
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page starts
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Total number of pages for a given row count
    ///
    /// Zero rows means zero pages
    pub fn total_pages(&self, total_rows: u64) -> u64 {
        total_rows.div_ceil(u64::from(self.limit))
    }
}

/// Parse a positive integer, falling back to a default
fn parse_positive(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}
