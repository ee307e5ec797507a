use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entities::notification::Notification;
use crate::domain::entities::record::{Record, RecordId, Value};
use crate::ui::state::table_state::TableState;
use crate::usecase::ports::notifier::Notifier;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("record id already exists: {0}")]
    DuplicateId(RecordId),

    #[error("field is read-only: {0}")]
    ReadOnlyField(String),
}

/// Row actions (approve, reject, add, delete). Each replaces part of the
/// state's raw collection and raises a notification.
pub struct EditService {
    notifier: Arc<dyn Notifier>,
    id_field: String,
}

impl EditService {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            id_field: "id".to_string(),
        }
    }

    /// Name of the column that mirrors the record id; `set_field` refuses it.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Sets one field on one record, e.g. `status = "Approved"`.
    pub fn set_field(
        &self,
        state: &mut TableState<Record>,
        id: &RecordId,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<(), EditError> {
        if field == self.id_field {
            return Err(self.reject(EditError::ReadOnlyField(field.to_string())));
        }
        let value = value.into();
        let Some(idx) = state.position(id) else {
            return Err(self.reject(EditError::NotFound(id.clone())));
        };

        let message = format!("{id}: {field} set to {value}");
        state.records_mut()[idx].set(field, value);
        info!(%id, field, "updated record");
        self.notifier
            .notify(Notification::success("Record updated", message));
        Ok(())
    }

    pub fn add(&self, state: &mut TableState<Record>, record: Record) -> Result<(), EditError> {
        if state.find(&record.id).is_some() {
            return Err(self.reject(EditError::DuplicateId(record.id)));
        }

        let id = record.id.clone();
        state.records_mut().push(record);
        info!(%id, "added record");
        self.notifier
            .notify(Notification::success("Record added", format!("{id} added")));
        Ok(())
    }

    pub fn delete(&self, state: &mut TableState<Record>, id: &RecordId) -> Result<Record, EditError> {
        let Some(idx) = state.position(id) else {
            return Err(self.reject(EditError::NotFound(id.clone())));
        };

        let removed = state.records_mut().remove(idx);
        info!(%id, "deleted record");
        self.notifier
            .notify(Notification::success("Record deleted", format!("{id} deleted")));
        Ok(removed)
    }

    fn reject(&self, err: EditError) -> EditError {
        warn!(error = %err, "rejected edit");
        self.notifier
            .notify(Notification::error("Action failed", err.to_string()));
        err
    }
}
