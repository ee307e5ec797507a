pub mod exporter;
pub mod notifier;
pub mod provider;
