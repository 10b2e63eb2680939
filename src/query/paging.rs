//! One page of results plus the metadata clients get in `X-Pagination`.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaData {
    pub current_page: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl MetaData {
    pub fn new(total_count: u64, page_number: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size);
        Self {
            current_page: page_number,
            total_pages,
            page_size,
            total_count,
            has_previous: page_number > 1,
            has_next: page_number < total_pages,
        }
    }

    /// Header value for `X-Pagination`.
    pub fn to_header_value(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub meta_data: MetaData,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, total_count: u64, page_number: u64, page_size: u64) -> Self {
        Self {
            items,
            meta_data: MetaData::new(total_count, page_number, page_size),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for PagedList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> IntoIterator for PagedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
