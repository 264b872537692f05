//! Filter normalization for the paged bundle-group listing.
//!
//! Turns raw, possibly-absent request inputs into a fully-populated
//! [`FilterSet`]. An absent category or status list means "all known";
//! an explicitly empty list stays empty and matches nothing.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::CatalogError;
use crate::ports::CategoryDirectory;
use crate::types::{CategoryId, OrganisationId, Status};

/// Filter inputs exactly as the caller supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilter {
    /// 1-based page number.
    pub page_num: i64,
    pub page_size: i64,
    pub organisation_id: Option<String>,
    pub category_ids: Option<Vec<String>>,
    pub statuses: Option<Vec<String>>,
}

/// Normalized constraints. Category and status sets are never "absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    /// `None` matches any organisation.
    pub organisation_id: Option<OrganisationId>,
    pub category_ids: BTreeSet<CategoryId>,
    pub statuses: BTreeSet<Status>,
}

impl FilterSet {
    /// Organisation AND any-of categories AND any-of statuses.
    pub fn matches(
        &self,
        organisation: Option<OrganisationId>,
        categories: &BTreeSet<CategoryId>,
        status: Status,
    ) -> bool {
        if let Some(wanted) = self.organisation_id {
            if organisation != Some(wanted) {
                return false;
            }
        }
        self.statuses.contains(&status)
            && categories.iter().any(|c| self.category_ids.contains(c))
    }
}

/// A store-ready paged query: 0-based page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleGroupQuery {
    pub page_index: u32,
    pub page_size: u32,
    pub filter: FilterSet,
}

impl BundleGroupQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }
}

/// External pages are 1-based; anything below 1 clamps to the first page.
pub fn page_index(page_num: i64) -> u32 {
    if page_num >= 1 {
        u32::try_from(page_num - 1).unwrap_or(u32::MAX)
    } else {
        0
    }
}

pub fn page_size(raw: i64) -> Result<u32, CatalogError> {
    if raw < 1 {
        return Err(CatalogError::InvalidPageSize(raw));
    }
    Ok(u32::try_from(raw).unwrap_or(u32::MAX))
}

/// Parse a status list; `None` stays `None`.
pub fn parse_statuses(raw: Option<&[String]>) -> Result<Option<BTreeSet<Status>>, CatalogError> {
    raw.map(|values| values.iter().map(|s| Status::parse(s)).collect())
        .transpose()
}

pub struct FilterNormalizer {
    categories: Arc<dyn CategoryDirectory>,
}

impl FilterNormalizer {
    pub fn new(categories: Arc<dyn CategoryDirectory>) -> Self {
        Self { categories }
    }

    /// Validate and default every filter dimension.
    ///
    /// Page size and every id/status are checked before the category
    /// directory is consulted, so a rejected request never reaches storage.
    pub async fn normalize(&self, raw: &RawFilter) -> Result<BundleGroupQuery, CatalogError> {
        let page_size = page_size(raw.page_size)?;
        let page_index = page_index(raw.page_num);

        let organisation_id = raw
            .organisation_id
            .as_deref()
            .map(OrganisationId::parse)
            .transpose()?;

        let explicit_categories = raw
            .category_ids
            .as_deref()
            .map(|ids| {
                ids.iter()
                    .map(|id| CategoryId::parse(id))
                    .collect::<Result<BTreeSet<_>, _>>()
            })
            .transpose()?;

        let statuses = parse_statuses(raw.statuses.as_deref())?.unwrap_or_else(Status::all);

        let category_ids = match explicit_categories {
            Some(ids) => ids,
            None => self
                .categories
                .list_categories()
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect(),
        };

        debug!(
            page_index,
            page_size,
            organisation = ?organisation_id,
            categories = category_ids.len(),
            statuses = statuses.len(),
            "normalized bundle group filter"
        );

        Ok(BundleGroupQuery {
            page_index,
            page_size,
            filter: FilterSet {
                organisation_id,
                category_ids,
                statuses,
            },
        })
    }
}
