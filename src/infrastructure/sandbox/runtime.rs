//! Template runtime backed by the JavaScript sandbox

use boa_engine::JsValue;

use super::{Sandbox, string_value};
use crate::generation::{
    GenerationError, TemplateFile, TemplateInstance, TemplateRuntime, ValueRef, ValueShape,
};
use crate::infrastructure::transpile::{ModuleFormat, assert_no_imports, transpile};

/// Guards and transpiles each template, then evaluates it in a fresh [`Sandbox`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SandboxRuntime;

impl TemplateRuntime for SandboxRuntime {
    fn instantiate(
        &self,
        template: &TemplateFile,
    ) -> Result<Box<dyn TemplateInstance>, GenerationError> {
        assert_no_imports(&template.source, &template.path)?;
        let code = transpile(&template.source, &template.path, ModuleFormat::CommonJs)?;

        let mut sandbox = Sandbox::new(&template.path)?;
        let exported = sandbox.evaluate(&code)?;
        Ok(Box::new(SandboxInstance {
            sandbox,
            file: template.path.clone(),
            values: vec![exported],
        }))
    }
}

/// Keeps every value handed out to the host alive for the instance's lifetime
struct SandboxInstance {
    sandbox: Sandbox,
    file: String,
    values: Vec<JsValue>,
}

impl SandboxInstance {
    fn value(&self, value: ValueRef) -> Result<JsValue, GenerationError> {
        self.values.get(value.0).cloned().ok_or_else(|| {
            GenerationError::evaluation(&self.file, format!("Unknown template value #{}", value.0))
        })
    }

    fn keep(&mut self, value: JsValue) -> ValueRef {
        self.values.push(value);
        ValueRef(self.values.len() - 1)
    }
}

impl TemplateInstance for SandboxInstance {
    fn default_export(&self) -> ValueRef {
        ValueRef(0)
    }

    fn inspect(&mut self, value: ValueRef) -> Result<ValueShape, GenerationError> {
        let value = self.value(value)?;
        if let Some(elements) = self.sandbox.array_elements(&value)? {
            let elements = elements.into_iter().map(|element| self.keep(element)).collect();
            return Ok(ValueShape::Array(elements));
        }

        Ok(match value.as_object() {
            Some(object) if object.is_callable() => ValueShape::Function,
            Some(_) => ValueShape::Object,
            None => ValueShape::Other(self.sandbox.describe(&value)),
        })
    }

    fn call(&mut self, function: ValueRef, argument: ValueRef) -> Result<ValueRef, GenerationError> {
        let function = self.value(function)?.as_callable().cloned().ok_or_else(|| {
            GenerationError::evaluation(&self.file, "Template value is not a function")
        })?;
        let argument = self.value(argument)?;

        let produced = self.sandbox.call(&function, &argument)?;
        let result = self.sandbox.resolve(produced)?;
        Ok(self.keep(result))
    }

    fn string(&mut self, value: ValueRef) -> Option<String> {
        self.values.get(value.0).and_then(string_value)
    }

    fn to_json(&mut self, value: ValueRef, indent: Option<usize>) -> Result<String, GenerationError> {
        let value = self.value(value)?;
        self.sandbox.to_json(&value, indent)
    }
}
