//! Port traits implemented by storage adapters.
//!
//! The service operates exclusively through these traits, so the same logic
//! runs against Postgres (`hub-catalog-postgres`) or [`crate::memory`].

use anyhow::Result;
use async_trait::async_trait;

use crate::filter::BundleGroupQuery;
use crate::paging::Page;
use crate::types::{AssociationLinks, BundleGroupEntity, BundleGroupId, Category, OrganisationId};

/// Persistence for bundle groups.
///
/// Every entity handed back has an id and fully-populated category and
/// bundle sets. Rows are ordered by name, then id.
#[async_trait]
pub trait BundleGroupStore: Send + Sync {
    /// Unpaged listing, optionally restricted to one organisation.
    async fn find_all(&self, organisation_id: Option<OrganisationId>)
        -> Result<Vec<BundleGroupEntity>>;

    /// One page of rows matching the filter, plus the count of all matches.
    async fn find_page(&self, query: &BundleGroupQuery) -> Result<Page<BundleGroupEntity>>;

    async fn find_by_id(&self, id: BundleGroupId) -> Result<Option<BundleGroupEntity>>;

    async fn exists(&self, id: BundleGroupId) -> Result<bool>;

    /// Insert when `entity.id` is `None` (the store assigns the id), otherwise
    /// write the row under the given id, then apply `links`. A `None` link
    /// list keeps the row's current associations.
    ///
    /// All-or-nothing: an unknown organisation, category or bundle fails the
    /// call as a storage failure and leaves the store unchanged.
    async fn save(
        &self,
        entity: &BundleGroupEntity,
        links: &AssociationLinks,
    ) -> Result<BundleGroupEntity>;
}

/// Enumerates every known category.
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;
}
