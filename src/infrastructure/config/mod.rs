//! Run configuration: pack layout from the project config and generation settings

pub mod pack_layout;
pub mod settings;

pub use pack_layout::*;
pub use settings::*;
