//! Infrastructure layer - concrete implementations of domain ports

pub mod config;
pub mod output;
pub mod paths;
pub mod sandbox;
pub mod templates;
pub mod transpile;

pub use output::*;
pub use templates::*;
