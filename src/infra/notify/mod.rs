pub mod log;
pub mod recording;
