//! Template discovery implementations

pub mod glob_discovery;

pub use glob_discovery::*;
