//! Catalog domain types.
//! Pure value types. No sqlx, no transport concerns.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::CatalogError;

// ── Identifiers ───────────────────────────────────────────────

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const KIND: &'static str = $kind;

            /// Parse a boundary id string. Fails with `MalformedReference`.
            pub fn parse(raw: &str) -> Result<Self, CatalogError> {
                raw.parse::<i64>()
                    .map(Self)
                    .map_err(|_| CatalogError::malformed(Self::KIND, raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Primary key of a bundle group.
    BundleGroupId,
    "bundle group"
);
entity_id!(OrganisationId, "organisation");
entity_id!(CategoryId, "category");
entity_id!(
    /// Primary key of a bundle, a child of zero or more bundle groups.
    BundleId,
    "bundle"
);

// ── Status ────────────────────────────────────────────────────

/// Publication lifecycle of a bundle group. Closed set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    NotPublished,
    Published,
    PublishReq,
    DeleteReq,
    Deleted,
}

impl Status {
    /// Every member of the enumeration.
    pub fn all() -> BTreeSet<Status> {
        Status::iter().collect()
    }

    /// Exact, case-sensitive parse of the wire spelling.
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        raw.parse()
            .map_err(|_| CatalogError::UnknownStatus(raw.to_string()))
    }
}

// ── Related aggregates ────────────────────────────────────────

/// Foreign-key stand-in for an organisation. Carries only the id; the store
/// resolves it when persisting. Never a hydrated organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganisationRef {
    pub id: OrganisationId,
}

impl OrganisationRef {
    pub fn new(id: OrganisationId) -> Self {
        Self { id }
    }
}

/// Category as enumerated by the category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

// ── BundleGroup aggregate ─────────────────────────────────────

/// Persisted bundle group with its relationship sets.
///
/// `id` is `None` on a transient entity that has not been stored yet.
/// Entities returned by a store always carry an id and fully-loaded
/// `categories` / `bundles` sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleGroupEntity {
    pub id: Option<BundleGroupId>,
    pub name: String,
    pub description: String,
    pub description_image: String,
    pub documentation_url: String,
    pub status: Status,
    pub organisation: Option<OrganisationRef>,
    pub categories: BTreeSet<CategoryId>,
    pub bundles: BTreeSet<BundleId>,
}

/// Association records requested on the write path. `None` leaves the
/// stored links untouched; `Some(empty)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationLinks {
    pub categories: Option<BTreeSet<CategoryId>>,
    pub bundles: Option<BTreeSet<BundleId>>,
}

impl AssociationLinks {
    pub fn is_empty(&self) -> bool {
        self.categories.is_none() && self.bundles.is_none()
    }
}
