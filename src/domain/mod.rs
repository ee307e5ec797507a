pub mod engine;
pub mod entities;
