//! Offset pagination and query-string helpers.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_LIST_SIZE: u64 = 20;

/// `{ from, size }` pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Offset of the first item.
    #[serde(default)]
    pub from: u64,
    /// Maximum number of items.
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_size() -> u64 {
    DEFAULT_LIST_SIZE
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            from: 0,
            size: DEFAULT_LIST_SIZE,
        }
    }
}

impl PaginationSettings {
    pub fn new(from: u64, size: u64) -> Self {
        Self { from, size }
    }

    /// The settings for the page after this one.
    pub fn next_page(&self) -> Self {
        Self {
            from: self.from + self.size,
            size: self.size,
        }
    }

    /// Query parameters for these settings.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("from", self.from.to_string()), ("size", self.size.to_string())]
    }
}

/// One page of results plus the server-reported total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedList<T> {
    /// Total number of items on the server, not the page length.
    pub total: u64,
    /// Offset this page was requested at.
    pub index: Option<u64>,
    /// Items on this page.
    pub results: Vec<T>,
}

impl<T> PaginatedList<T> {
    pub fn new(total: u64, index: Option<u64>, results: Vec<T>) -> Self {
        Self {
            total,
            index,
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether the server holds items past this page.
    pub fn has_more(&self) -> bool {
        self.index.unwrap_or(0) + (self.results.len() as u64) < self.total
    }

    /// Convert every item, keeping the pagination bookkeeping.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedList<U> {
        PaginatedList {
            total: self.total,
            index: self.index,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Wire shape of every Nexus list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(rename = "_total")]
    pub total: u64,
    #[serde(rename = "_results", default = "Vec::new")]
    pub results: Vec<T>,
}

/// Render `?k=v&k2=v2`, or an empty string when there are no pairs.
/// Values are percent-encoded.
pub fn build_query_params<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return String::new();
    }

    let rendered: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), urlencoding::encode(v.as_ref())))
        .collect();
    format!("?{}", rendered.join("&"))
}
