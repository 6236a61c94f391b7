//! Port interfaces for the generation domain

use crate::generation::{GenerationError, TemplateFile};
use async_trait::async_trait;

/// Finds and loads template files
#[async_trait]
pub trait TemplateDiscovery: Send + Sync {
    /// Paths of all templates matching `include` and not matching `exclude`,
    /// deduplicated and sorted.
    async fn discover(
        &self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<String>, GenerationError>;

    /// Reads one discovered template.
    async fn load(&self, path: &str) -> Result<TemplateFile, GenerationError>;
}

/// Handle to a value held by a [`TemplateInstance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRef(pub usize);

/// The shape of a template value as seen from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueShape {
    Array(Vec<ValueRef>),
    Function,
    /// Any other non-callable object
    Object,
    /// A primitive, described for diagnostics
    Other(String),
}

impl ValueShape {
    /// Short description used in error messages, e.g. "an array of length 2".
    pub fn describe(&self) -> String {
        match self {
            Self::Array(elements) => format!("an array of length {}", elements.len()),
            Self::Function => "a function".to_string(),
            Self::Object => "an object".to_string(),
            Self::Other(found) => found.clone(),
        }
    }
}

/// Turns template source into an evaluated module
pub trait TemplateRuntime: Send + Sync {
    /// Checks, compiles and evaluates `template`. The returned instance's
    /// [`TemplateInstance::default_export`] refers to the module's default
    /// export, `undefined` when there is none.
    fn instantiate(
        &self,
        template: &TemplateFile,
    ) -> Result<Box<dyn TemplateInstance>, GenerationError>;
}

/// One evaluated template and the values it produced
pub trait TemplateInstance {
    fn default_export(&self) -> ValueRef;

    fn inspect(&mut self, value: ValueRef) -> Result<ValueShape, GenerationError>;

    /// Calls `function` with one argument. A returned promise is awaited.
    fn call(&mut self, function: ValueRef, argument: ValueRef) -> Result<ValueRef, GenerationError>;

    /// The value as a string, when it is one.
    fn string(&mut self, value: ValueRef) -> Option<String>;

    /// JSON text of the value, indented by `indent` spaces when given.
    fn to_json(&mut self, value: ValueRef, indent: Option<usize>) -> Result<String, GenerationError>;
}
