//! Store-native pages and the paged result envelope.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A slice of matching rows as produced by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 0-based.
    pub page_index: u32,
    pub page_size: u32,
    /// Count of all rows matching the filter, not just this slice.
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            page_index: self.page_index,
            page_size: self.page_size,
            total_elements: self.total_elements,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    /// Total number of pages.
    pub last_page: u64,
}

/// Paged result envelope handed to transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedContent<T> {
    pub payload: Vec<T>,
    pub metadata: PageMetadata,
}

impl<T> PagedContent<T> {
    pub fn from_page(page: Page<T>) -> Result<Self, CatalogError> {
        let metadata = PageMetadata {
            page: page.page_index.saturating_add(1),
            page_size: page.page_size,
            total_items: page.total_elements,
            last_page: total_pages(page.total_elements, page.page_size)?,
        };
        Ok(Self {
            payload: page.items,
            metadata,
        })
    }

    pub fn page_index(&self) -> u32 {
        self.metadata.page - 1
    }

    pub fn total_pages(&self) -> u64 {
        self.metadata.last_page
    }
}

/// `ceil(total / size)`.
pub fn total_pages(total_elements: u64, page_size: u32) -> Result<u64, CatalogError> {
    if page_size == 0 {
        return Err(CatalogError::InvalidPageSize(0));
    }
    Ok(total_elements.div_ceil(u64::from(page_size)))
}
