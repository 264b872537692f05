//! In-memory catalog store for tests and local runs.
//!
//! Behaves like the relational store: ids come from a sequence, the
//! organisation stub and every linked category/bundle must name a known
//! row (otherwise the write fails like a foreign-key violation), and
//! listings are ordered by name, then id.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::filter::BundleGroupQuery;
use crate::paging::Page;
use crate::ports::{BundleGroupStore, CategoryDirectory};
use crate::types::{
    AssociationLinks, BundleGroupEntity, BundleGroupId, BundleId, Category, CategoryId,
    OrganisationId,
};

#[derive(Default)]
struct Inner {
    last_id: i64,
    groups: BTreeMap<BundleGroupId, BundleGroupEntity>,
    organisations: BTreeSet<OrganisationId>,
    categories: BTreeMap<CategoryId, Category>,
    bundles: BTreeSet<BundleId>,
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: RwLock<Inner>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_organisation(&self, id: OrganisationId) {
        self.write_recovering().organisations.insert(id);
    }

    pub fn add_category(&self, id: CategoryId, name: &str) {
        self.write_recovering().categories.insert(
            id,
            Category {
                id,
                name: name.to_string(),
                description: String::new(),
            },
        );
    }

    pub fn add_bundle(&self, id: BundleId) {
        self.write_recovering().bundles.insert(id);
    }

    /// Drop a bundle group row, as a concurrent delete would.
    pub fn remove(&self, id: BundleGroupId) -> bool {
        self.write_recovering().groups.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.read_recovering().groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Seeding helpers have no error channel; a poisoned lock still holds
    // consistent data because every mutation is a single insert/remove.
    fn write_recovering(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_recovering(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|e| anyhow!("Lock: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|e| anyhow!("Lock: {}", e))
    }
}

fn sorted<'a>(rows: impl Iterator<Item = &'a BundleGroupEntity>) -> Vec<BundleGroupEntity> {
    let mut rows: Vec<_> = rows.cloned().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    rows
}

#[async_trait]
impl BundleGroupStore for MemoryCatalogStore {
    async fn find_all(
        &self,
        organisation_id: Option<OrganisationId>,
    ) -> Result<Vec<BundleGroupEntity>> {
        let inner = self.read()?;
        Ok(sorted(inner.groups.values().filter(|g| {
            organisation_id.map_or(true, |org| g.organisation.map(|o| o.id) == Some(org))
        })))
    }

    async fn find_page(&self, query: &BundleGroupQuery) -> Result<Page<BundleGroupEntity>> {
        let inner = self.read()?;
        let matching = sorted(inner.groups.values().filter(|g| {
            query
                .filter
                .matches(g.organisation.map(|o| o.id), &g.categories, g.status)
        }));
        let total_elements = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .collect();

        Ok(Page {
            items,
            page_index: query.page_index,
            page_size: query.page_size,
            total_elements,
        })
    }

    async fn find_by_id(&self, id: BundleGroupId) -> Result<Option<BundleGroupEntity>> {
        Ok(self.read()?.groups.get(&id).cloned())
    }

    async fn exists(&self, id: BundleGroupId) -> Result<bool> {
        Ok(self.read()?.groups.contains_key(&id))
    }

    async fn save(
        &self,
        entity: &BundleGroupEntity,
        links: &AssociationLinks,
    ) -> Result<BundleGroupEntity> {
        let mut inner = self.write()?;

        // Every reference is checked before anything is written.
        if let Some(org) = entity.organisation {
            if !inner.organisations.contains(&org.id) {
                bail!(
                    "foreign key violation: organisation {} does not exist",
                    org.id
                );
            }
        }
        if let Some(categories) = &links.categories {
            let missing = categories
                .iter()
                .find(|c| !inner.categories.contains_key(*c));
            if let Some(missing) = missing {
                bail!("foreign key violation: category {} does not exist", missing);
            }
        }
        if let Some(bundles) = &links.bundles {
            if let Some(missing) = bundles.iter().find(|b| !inner.bundles.contains(*b)) {
                bail!("foreign key violation: bundle {} does not exist", missing);
            }
        }

        let id = match entity.id {
            Some(id) => {
                inner.last_id = inner.last_id.max(id.0);
                id
            }
            None => {
                inner.last_id += 1;
                BundleGroupId(inner.last_id)
            }
        };

        let (current_categories, current_bundles) = inner
            .groups
            .get(&id)
            .map(|existing| (existing.categories.clone(), existing.bundles.clone()))
            .unwrap_or_default();

        let stored = BundleGroupEntity {
            id: Some(id),
            categories: links.categories.clone().unwrap_or(current_categories),
            bundles: links.bundles.clone().unwrap_or(current_bundles),
            ..entity.clone()
        };
        inner.groups.insert(id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl CategoryDirectory for MemoryCatalogStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.read()?.categories.values().cloned().collect())
    }
}
