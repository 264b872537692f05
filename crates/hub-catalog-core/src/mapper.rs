//! Entity ↔ DTO mapping for bundle groups.
//!
//! Read direction flattens every relationship to decimal string ids. Write
//! direction copies scalars, validates the status, and turns an organisation
//! id into an [`OrganisationRef`] stub. It never loads anything and never
//! materializes category/bundle associations; those travel separately as
//! [`AssociationLinks`].

use std::collections::BTreeSet;

use anyhow::anyhow;

use crate::dto::{BundleGroup, BundleGroupNoId};
use crate::error::CatalogError;
use crate::types::{
    AssociationLinks, BundleGroupEntity, BundleGroupId, BundleId, CategoryId, OrganisationId,
    OrganisationRef, Status,
};

/// Public shape of a stored bundle group.
///
/// A stored entity without an id breaks the store contract and is reported
/// as a storage failure.
pub fn to_public(entity: &BundleGroupEntity) -> Result<BundleGroup, CatalogError> {
    let id = entity
        .id
        .ok_or_else(|| anyhow!("store returned bundle group '{}' without an id", entity.name))?;
    Ok(BundleGroup {
        bundle_group_id: id.to_string(),
        body: to_public_body(entity),
    })
}

/// Everything but the id.
pub fn to_public_body(entity: &BundleGroupEntity) -> BundleGroupNoId {
    BundleGroupNoId {
        name: entity.name.clone(),
        description: entity.description.clone(),
        description_image: entity.description_image.clone(),
        documentation_url: entity.documentation_url.clone(),
        status: entity.status.to_string(),
        organisation_id: entity.organisation.map(|org| org.id.to_string()),
        categories: Some(entity.categories.iter().map(ToString::to_string).collect()),
        children: Some(entity.bundles.iter().map(ToString::to_string).collect()),
    }
}

/// Transient entity built from a write-path DTO.
///
/// `existing_id` comes from the request path on update, never from the body.
pub fn to_entity(
    dto: &BundleGroupNoId,
    existing_id: Option<BundleGroupId>,
) -> Result<BundleGroupEntity, CatalogError> {
    let status = Status::parse(&dto.status)?;
    let organisation = dto
        .organisation_id
        .as_deref()
        .map(OrganisationId::parse)
        .transpose()?
        .map(OrganisationRef::new);

    Ok(BundleGroupEntity {
        id: existing_id,
        name: dto.name.clone(),
        description: dto.description.clone(),
        description_image: dto.description_image.clone(),
        documentation_url: dto.documentation_url.clone(),
        status,
        organisation,
        categories: BTreeSet::new(),
        bundles: BTreeSet::new(),
    })
}

/// Association lists carried by a write-path DTO, parsed but not applied.
pub fn links_of(dto: &BundleGroupNoId) -> Result<AssociationLinks, CatalogError> {
    Ok(AssociationLinks {
        categories: dto
            .categories
            .as_deref()
            .map(|ids| parse_ids(ids, CategoryId::parse))
            .transpose()?,
        bundles: dto
            .children
            .as_deref()
            .map(|ids| parse_ids(ids, BundleId::parse))
            .transpose()?,
    })
}

fn parse_ids<T: Ord>(
    raw: &[String],
    parse: impl Fn(&str) -> Result<T, CatalogError>,
) -> Result<BTreeSet<T>, CatalogError> {
    raw.iter().map(|s| parse(s)).collect()
}
