pub mod notification;
pub mod query;
pub mod record;
