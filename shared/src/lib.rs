//! Shared types and models for the Crop Advisor
//!
//! This crate contains the pure parts of the system (domain models, the
//! season/soil rule table and input validation) shared between the backend
//! and the browser dashboard (via WASM).

pub mod models;
pub mod rules;
pub mod types;
pub mod validation;

pub use models::*;
pub use rules::*;
pub use types::*;
pub use validation::*;
