use serde::{Deserialize, Serialize};

/// One page of catalog results. Absent pagination fields default to zero so a
/// trimmed upstream response still decodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    /// Map the results, keeping the pagination fields.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            results: self.results.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}
