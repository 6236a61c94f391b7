//! Generation domain module - turns templates into JSON artifacts
//!
//! A template is evaluated in its own sandbox; the shape of its default
//! export decides whether it yields one artifact or one per item.

pub mod contract;
pub mod emitter;
pub mod errors;
pub mod orchestrator;
pub mod rules;
pub mod traits;
pub mod types;

pub use contract::*;
pub use emitter::*;
pub use errors::*;
pub use orchestrator::*;
pub use rules::*;
pub use traits::*;
pub use types::*;
