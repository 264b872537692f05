//! Public (transport) representation of catalog entities.
//!
//! Every identifier is a decimal string. The write-path shape
//! [`BundleGroupNoId`] has no id field at all; the read-path
//! [`BundleGroup`] adds `bundleGroupId` on top of it.

use serde::{Deserialize, Serialize};

use crate::types::Category;

/// Bundle group as accepted on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleGroupNoId {
    pub name: String,
    pub description: String,
    pub description_image: String,
    #[serde(default)]
    pub documentation_url: String,
    /// Wire spelling of [`crate::types::Status`]; validated by the mapper.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

/// Bundle group as returned by every read operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleGroup {
    pub bundle_group_id: String,
    #[serde(flatten)]
    pub body: BundleGroupNoId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub category_id: String,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}
