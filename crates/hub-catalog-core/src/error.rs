use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed {kind} id: '{value}'")]
    MalformedReference { kind: &'static str, value: String },

    #[error("unknown status: '{0}'")]
    UnknownStatus(String),

    #[error("invalid page size: {0} (must be >= 1)")]
    InvalidPageSize(i64),

    #[error("storage failure: {0}")]
    StorageFailure(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn malformed(kind: &'static str, value: impl Into<String>) -> Self {
        Self::MalformedReference {
            kind,
            value: value.into(),
        }
    }

    /// Client errors are caller mistakes; everything else is the store's fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::StorageFailure(_))
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::MalformedReference { .. } => 400,
            Self::UnknownStatus(_) => 400,
            Self::InvalidPageSize(_) => 400,
            Self::StorageFailure(_) => 500,
        }
    }
}
