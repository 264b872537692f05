//! Capability declarations for catalog operations.
//!
//! The core performs no authorization. Each operation declares the roles
//! that may invoke it and the transport rejects callers before the core runs.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter, EnumString,
)]
pub enum Role {
    #[serde(rename = "eh-admin")]
    #[strum(serialize = "eh-admin")]
    Admin,
    #[serde(rename = "eh-author")]
    #[strum(serialize = "eh-author")]
    Author,
    #[serde(rename = "eh-manager")]
    #[strum(serialize = "eh-manager")]
    Manager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOperation {
    ListBundleGroups,
    ListBundleGroupsFiltered,
    GetBundleGroup,
    CreateBundleGroup,
    UpdateBundleGroup,
    ListCategories,
}

impl CatalogOperation {
    /// Roles of which the caller must hold at least one. Empty = public.
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Self::ListBundleGroups
            | Self::ListBundleGroupsFiltered
            | Self::GetBundleGroup
            | Self::ListCategories => &[],
            Self::CreateBundleGroup | Self::UpdateBundleGroup => {
                &[Role::Admin, Role::Author, Role::Manager]
            }
        }
    }

    pub fn is_public(&self) -> bool {
        self.required_roles().is_empty()
    }

    /// Whether a caller holding `roles` may invoke this operation.
    pub fn permits<'a>(&self, roles: impl IntoIterator<Item = &'a Role>) -> bool {
        let required = self.required_roles();
        required.is_empty() || roles.into_iter().any(|r| required.contains(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_public() {
        assert!(CatalogOperation::ListBundleGroupsFiltered.is_public());
        assert!(CatalogOperation::GetBundleGroup.permits(&[]));
    }

    #[test]
    fn writes_need_a_hub_role() {
        let op = CatalogOperation::UpdateBundleGroup;
        assert!(!op.permits(&[]));
        assert!(op.permits(&[Role::Author]));
        assert!(op.permits(&[Role::Manager, Role::Admin]));
    }

    #[test]
    fn role_names_match_identity_provider() {
        assert_eq!("eh-admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Manager.as_ref(), "eh-manager");
        assert!("admin".parse::<Role>().is_err());
    }
}
