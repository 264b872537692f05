//! CatalogService: bundle-group queries and writes.
//!
//! Takes its store ports via `Arc<dyn PortTrait>` so the same logic runs
//! against Postgres or [`crate::memory::MemoryCatalogStore`]. Stateless per
//! call; every store error surfaces as `CatalogError::StorageFailure`.
//!
//! Update is a two-step protocol (existence check, then write) with no
//! transaction around it. A delete landing between the two steps makes the
//! write recreate the row under the same id.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::dto::{BundleGroup, BundleGroupNoId, CategoryDto};
use crate::error::CatalogError;
use crate::filter::{BundleGroupQuery, FilterNormalizer, RawFilter};
use crate::mapper;
use crate::paging::PagedContent;
use crate::ports::{BundleGroupStore, CategoryDirectory};
use crate::types::{BundleGroupId, OrganisationId};

pub type Result<T> = std::result::Result<T, CatalogError>;

/// The operation surface handed to transport bindings.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Unpaged listing, all organisations unless one is named.
    async fn list_bundle_groups(&self, organisation_id: Option<&str>) -> Result<Vec<BundleGroup>>;

    /// Normalize raw filter inputs, then run [`CatalogService::list`].
    async fn list_bundle_groups_filtered(
        &self,
        raw: &RawFilter,
    ) -> Result<PagedContent<BundleGroup>>;

    /// Paged listing for an already-normalized query.
    async fn list(&self, query: &BundleGroupQuery) -> Result<PagedContent<BundleGroup>>;

    /// `Ok(None)` when no row has this id.
    async fn get_bundle_group(&self, id: &str) -> Result<Option<BundleGroup>>;

    /// Create when `id` is `None`, otherwise update an existing row.
    async fn upsert_bundle_group(
        &self,
        id: Option<&str>,
        body: &BundleGroupNoId,
    ) -> Result<BundleGroup>;

    async fn create_bundle_group(&self, body: &BundleGroupNoId) -> Result<BundleGroup> {
        self.upsert_bundle_group(None, body).await
    }

    async fn update_bundle_group(&self, id: &str, body: &BundleGroupNoId) -> Result<BundleGroup> {
        self.upsert_bundle_group(Some(id), body).await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryDto>>;
}

pub struct CatalogServiceImpl {
    bundle_groups: Arc<dyn BundleGroupStore>,
    categories: Arc<dyn CategoryDirectory>,
    normalizer: FilterNormalizer,
}

impl CatalogServiceImpl {
    pub fn new(
        bundle_groups: Arc<dyn BundleGroupStore>,
        categories: Arc<dyn CategoryDirectory>,
    ) -> Self {
        let normalizer = FilterNormalizer::new(Arc::clone(&categories));
        Self {
            bundle_groups,
            categories,
            normalizer,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_bundle_groups(&self, organisation_id: Option<&str>) -> Result<Vec<BundleGroup>> {
        debug!(organisation_id, "listing bundle groups");
        let organisation_id = organisation_id.map(OrganisationId::parse).transpose()?;
        self.bundle_groups
            .find_all(organisation_id)
            .await?
            .iter()
            .map(mapper::to_public)
            .collect()
    }

    async fn list_bundle_groups_filtered(
        &self,
        raw: &RawFilter,
    ) -> Result<PagedContent<BundleGroup>> {
        let query = self.normalizer.normalize(raw).await?;
        self.list(&query).await
    }

    async fn list(&self, query: &BundleGroupQuery) -> Result<PagedContent<BundleGroup>> {
        if query.page_size == 0 {
            return Err(CatalogError::InvalidPageSize(0));
        }
        let page = self.bundle_groups.find_page(query).await?;
        debug!(
            page_index = page.page_index,
            total = page.total_elements,
            rows = page.items.len(),
            "bundle group page loaded"
        );
        PagedContent::from_page(page.map(|entity| mapper::to_public(&entity))?)
    }

    async fn get_bundle_group(&self, id: &str) -> Result<Option<BundleGroup>> {
        debug!(id, "getting bundle group");
        let id = BundleGroupId::parse(id)?;
        match self.bundle_groups.find_by_id(id).await? {
            Some(entity) => mapper::to_public(&entity).map(Some),
            None => {
                warn!("Requested bundle group '{}' does not exist", id);
                Ok(None)
            }
        }
    }

    async fn upsert_bundle_group(
        &self,
        id: Option<&str>,
        body: &BundleGroupNoId,
    ) -> Result<BundleGroup> {
        let existing_id = id.map(BundleGroupId::parse).transpose()?;
        let entity = mapper::to_entity(body, existing_id)?;
        let links = mapper::links_of(body)?;

        if let Some(id) = existing_id {
            if !self.bundle_groups.exists(id).await? {
                warn!("Bundle group '{}' does not exist", id);
                return Err(CatalogError::NotFound(format!("bundle group {id}")));
            }
        }

        let saved = self.bundle_groups.save(&entity, &links).await?;
        let saved_id = saved
            .id
            .ok_or_else(|| anyhow!("store saved bundle group '{}' without an id", saved.name))?;

        if existing_id.is_some() {
            info!("Updated bundle group {}", saved_id);
        } else {
            info!("Created bundle group {} '{}'", saved_id, saved.name);
        }
        mapper::to_public(&saved)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryDto>> {
        Ok(self
            .categories
            .list_categories()
            .await?
            .iter()
            .map(CategoryDto::from)
            .collect())
    }
}
