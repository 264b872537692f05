//! Query-string decoding for the bundle-group listings.
//!
//! List parameters may be repeated (`statuses=A&statuses=B`) or
//! comma-separated (`statuses=A,B`). A key that is present with no usable
//! value is an explicit empty list; a missing key is `None`.

use hub_catalog_core::filter::RawFilter;
use url::form_urlencoded;

use crate::error::AppError;

/// Decoded `key=value` pairs in request order.
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        Self(
            form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// First value of `key`; an empty value counts as absent.
    pub fn single(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        let mut seen = false;
        let mut values = Vec::new();
        for (_, value) in self.0.iter().filter(|(k, _)| k == key) {
            seen = true;
            values.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            );
        }
        seen.then_some(values)
    }

    pub fn required_number(&self, key: &str) -> Result<i64, AppError> {
        let value = self
            .single(key)
            .ok_or_else(|| AppError::BadRequest(format!("missing query parameter '{key}'")))?;
        value.parse().map_err(|_| {
            AppError::BadRequest(format!("query parameter '{key}' is not a number: '{value}'"))
        })
    }

    pub fn raw_filter(&self) -> Result<RawFilter, AppError> {
        Ok(RawFilter {
            page_num: self.required_number("pageNum")?,
            page_size: self.required_number("pageSize")?,
            organisation_id: self.single("organisationId").map(str::to_string),
            category_ids: self.list("categoryIds"),
            statuses: self.list("statuses"),
        })
    }
}
