//! Structured logging: span definitions and subscriber setup.

pub mod setup;
pub mod spans;

pub use setup::init_tracing;
