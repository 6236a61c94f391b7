//! packgen - generates add-on JSON artifacts from TypeScript templates
//!
//! Templates are discovered by glob, transpiled to CommonJS, evaluated in an
//! isolated JavaScript context and written beside themselves as JSON.
#![deny(unsafe_code)]

pub mod application;
pub mod generation;
pub mod infrastructure;
