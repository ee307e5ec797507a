use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Success,
    Info,
    Warning,
    Error,
}

/// A toast raised by a table action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub variant: Variant,
    pub at: DateTime<Local>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, variant: Variant) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            variant,
            at: Local::now(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Variant::Success)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Variant::Error)
    }
}
