use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::notification::Notification;
use crate::domain::entities::record::Record;
use crate::ui::state::table_state::TableState;
use crate::usecase::ports::notifier::Notifier;
use crate::usecase::ports::provider::{ProviderError, RecordProvider};

pub struct ImportService {
    provider: Arc<dyn RecordProvider>,
    notifier: Arc<dyn Notifier>,
}

impl ImportService {
    pub fn new(provider: Arc<dyn RecordProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self { provider, notifier }
    }

    /// Loads the full collection, rejecting it if two records share an id.
    /// Success and failure are both reported through the notifier.
    pub fn load(&self) -> Result<Vec<Record>, ProviderError> {
        let records = self.provider.load().and_then(|records| {
            ensure_unique_ids(&records)?;
            Ok(records)
        });

        match records {
            Ok(records) => {
                info!(count = records.len(), "loaded records");
                self.notifier.notify(Notification::success(
                    "Data refreshed",
                    format!("{} records loaded", records.len()),
                ));
                Ok(records)
            }
            Err(err) => {
                warn!(error = %err, "failed to load records");
                self.notifier
                    .notify(Notification::error("Refresh failed", err.to_string()));
                Err(err)
            }
        }
    }

    /// Replaces the state's records with a fresh load. The current query
    /// parameters are kept.
    pub fn refresh(&self, state: &mut TableState<Record>) -> Result<usize, ProviderError> {
        let records = self.load()?;
        let count = records.len();
        state.replace_records(records);
        Ok(count)
    }
}

fn ensure_unique_ids(records: &[Record]) -> Result<(), ProviderError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(&record.id) {
            return Err(ProviderError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}
