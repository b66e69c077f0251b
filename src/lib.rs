//! Record Keeper
//!
//! A validated record-management API over JSON document stores:
//! - Patients with derived BMI and verdict
//! - Students with derived average, maximum score and grade
//! - Partial updates merged onto stored records and revalidated as a whole
//! - Whole-store persistence with atomic file replacement

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod store;
pub mod utils;

// Re-exports for convenience
pub use config::ServiceConfig;
pub use error::{RecordError, ValidationError};
pub use models::{Entity, Patient, Student};
pub use store::{JsonFileGateway, Repository, Store};
