pub mod concurrent_writers;
pub mod configuration;
