//! Domain models for the Crop Advisor

mod market;
mod prediction;
mod records;
mod sample;
mod season;
mod weather;

pub use market::*;
pub use prediction::*;
pub use records::*;
pub use sample::*;
pub use season::*;
pub use weather::*;
