use crate::domain::entities::record::Record;
use crate::usecase::ports::provider::{ProviderError, RecordProvider};

/// Serves a fixed collection, e.g. seed data bundled with a dashboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    records: Vec<Record>,
}

impl MemoryProvider {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordProvider for MemoryProvider {
    fn load(&self) -> Result<Vec<Record>, ProviderError> {
        Ok(self.records.clone())
    }
}
