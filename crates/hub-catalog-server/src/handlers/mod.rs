pub mod bundle_groups;
pub mod categories;
pub mod health;
