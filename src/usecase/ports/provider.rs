use thiserror::Error;

use crate::domain::entities::record::{Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Message(String),

    #[error("duplicate record id: {0}")]
    DuplicateId(RecordId),
}

/// Source of a table's full record collection.
pub trait RecordProvider: Send + Sync {
    fn load(&self) -> Result<Vec<Record>, ProviderError>;
}
