// Library exports for testing
pub mod analysis;
pub mod assembly;
pub mod config;
pub mod context;
pub mod delivery;
pub mod errors;
pub mod grading;
pub mod models;
pub mod store;
