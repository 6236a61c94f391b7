//! Application layer - orchestrates use cases and coordinates between domains

pub mod dto;
pub mod generate_artifacts;
pub mod traits;

pub use dto::*;
pub use generate_artifacts::*;
pub use traits::*;
