//! Isolated evaluation of transpiled template modules.
//!
//! Each template gets its own [`Sandbox`] backed by a fresh `boa_engine`
//! context. Besides the ECMAScript built-ins, the only globals are the ones
//! installed by `prelude.js`: `module`, `exports`, `require` (always throws),
//! `console`, `process.env`, `setTimeout`/`clearTimeout` and `Buffer`.
//! `Buffer`'s byte codecs are native functions from [`codec`].

mod codec;
mod runtime;

pub use runtime::SandboxRuntime;

use boa_engine::{
    Context, JsError, JsNativeError, JsObject, JsResult, JsString, JsValue, NativeFunction,
    Source, js_string, object::builtins::JsArray, property::Attribute,
};
use tracing::{debug, error, info, trace, warn};

use crate::generation::GenerationError;

const PRELUDE: &str = include_str!("prelude.js");

const GLOBALS: [&str; 8] = [
    "module",
    "exports",
    "require",
    "console",
    "process",
    "setTimeout",
    "clearTimeout",
    "Buffer",
];

const MODULE_LOAD_DISABLED: &str = "ModuleLoadDisabledError";

/// The result of calling a template function: either the value itself or a
/// pending promise that has to be resolved before use.
#[derive(Debug)]
pub enum Produced {
    Ready(JsValue),
    /// Settlement record of a native promise
    Deferred(JsObject),
}

/// Single-use execution context for one template
pub struct Sandbox {
    context: Context,
    file: String,
    module: JsObject,
    host: JsObject,
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox").field("file", &self.file).finish()
    }
}

impl Sandbox {
    /// Creates a fresh context for `file` with the template capability set
    /// installed.
    pub fn new(file: &str) -> Result<Self, GenerationError> {
        let mut context = Context::default();
        let (module, host) = install(&mut context)
            .map_err(|e| GenerationError::evaluation(file, format!("Sandbox setup failed: {e}")))?;

        Ok(Self {
            context,
            file: file.to_string(),
            module,
            host,
        })
    }

    /// Runs transpiled module code to completion and returns
    /// `module.exports.default`, or `undefined` when there is none.
    pub fn evaluate(&mut self, code: &str) -> Result<JsValue, GenerationError> {
        // Module code starts on the wrapper's first line so engine line numbers match the template.
        let wrapped = format!("(function () {{ {code}\n}})();");
        debug!(bytes = wrapped.len(), "Evaluating module");

        let result = self.context.eval(Source::from_bytes(wrapped.as_str()));
        self.context.run_jobs();
        result.map_err(|e| self.failure(e))?;

        let module = self.module.clone();
        let exports = self.field(&module, "exports")?;
        match exports.as_object() {
            Some(exports) => self.field(&exports.clone(), "default"),
            None => Ok(JsValue::undefined()),
        }
    }

    /// Calls `function` with a single argument.
    pub fn call(&mut self, function: &JsObject, argument: &JsValue) -> Result<Produced, GenerationError> {
        let value = function
            .call(
                &JsValue::undefined(),
                std::slice::from_ref(argument),
                &mut self.context,
            )
            .map_err(|e| self.failure(e))?;

        let deferred = self
            .call_host("isDeferred", std::slice::from_ref(&value))
            .map_err(|e| self.failure(e))?;
        if !deferred.to_boolean() {
            return Ok(Produced::Ready(value));
        }

        let record = self
            .call_host("track", &[value])
            .map_err(|e| self.failure(e))?;
        match record.as_object() {
            Some(record) => Ok(Produced::Deferred(record.clone())),
            None => Err(GenerationError::evaluation(
                &self.file,
                "Failed to track promise returned by the template",
            )),
        }
    }

    /// Resolves a produced value, running queued jobs and virtual timers
    /// until a deferred value settles.
    pub fn resolve(&mut self, produced: Produced) -> Result<JsValue, GenerationError> {
        let record = match produced {
            Produced::Ready(value) => return Ok(value),
            Produced::Deferred(record) => record,
        };

        loop {
            self.context.run_jobs();

            if self.field(&record, "settled")?.to_boolean() {
                let value = self.field(&record, "value")?;
                if self.field(&record, "rejected")?.to_boolean() {
                    return Err(self.failure(JsError::from_opaque(value)));
                }
                return Ok(value);
            }

            let fired = self
                .call_host("runNextTimer", &[])
                .map_err(|e| self.failure(e))?;
            if !fired.to_boolean() {
                return Err(GenerationError::evaluation(
                    &self.file,
                    "Promise returned by the template never settled",
                ));
            }
        }
    }

    /// Returns the elements of `value` when it is an array.
    pub fn array_elements(&mut self, value: &JsValue) -> Result<Option<Vec<JsValue>>, GenerationError> {
        let Some(object) = value.as_object().filter(|object| object.is_array()) else {
            return Ok(None);
        };

        let length = JsArray::from_object(object.clone())
            .and_then(|array| array.length(&mut self.context))
            .map_err(|e| self.failure(e))?;

        let mut elements = Vec::new();
        for index in 0..length {
            let element = object
                .get(index, &mut self.context)
                .map_err(|e| self.failure(e))?;
            elements.push(element);
        }
        Ok(Some(elements))
    }

    /// Serializes `value` with the engine's `JSON.stringify`, indented by
    /// `indent` spaces when given. Number formatting is the engine's.
    pub fn to_json(&mut self, value: &JsValue, indent: Option<usize>) -> Result<String, GenerationError> {
        let indent = indent.map_or(JsValue::undefined(), |width| JsValue::from(width as u32));
        let text = match self.call_host("stringify", &[value.clone(), indent]) {
            Ok(text) => text,
            Err(e) => {
                let (_, message, _) = self.error_info(e);
                return Err(GenerationError::serialization(&self.file, message));
            }
        };

        string_value(&text).ok_or_else(|| {
            let found = self.describe(value);
            GenerationError::serialization(&self.file, format!("{found} is not JSON-serializable"))
        })
    }

    /// Short human-readable description of a value's shape for diagnostics.
    pub fn describe(&mut self, value: &JsValue) -> String {
        if value.is_undefined() {
            return "undefined".to_string();
        }
        if value.is_null() {
            return "null".to_string();
        }
        if value.is_string() {
            return "a string".to_string();
        }
        if value.is_number() {
            return "a number".to_string();
        }
        if value.is_boolean() {
            return "a boolean".to_string();
        }
        if value.is_bigint() {
            return "a bigint".to_string();
        }
        if value.is_symbol() {
            return "a symbol".to_string();
        }

        match value.as_object() {
            Some(object) if object.is_callable() => "a function".to_string(),
            Some(object) if object.is_array() => {
                match JsArray::from_object(object.clone()).and_then(|a| a.length(&mut self.context)) {
                    Ok(length) => format!("an array of length {length}"),
                    Err(_) => "an array".to_string(),
                }
            }
            _ => "an object".to_string(),
        }
    }

    fn field(&mut self, object: &JsObject, key: &str) -> Result<JsValue, GenerationError> {
        object
            .get(JsString::from(key), &mut self.context)
            .map_err(|e| self.failure(e))
    }

    fn call_host(&mut self, name: &str, args: &[JsValue]) -> JsResult<JsValue> {
        let function = self.host.get(JsString::from(name), &mut self.context)?;
        let function = function.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message(format!("sandbox helper {name} is not callable"))
        })?;
        function.call(&JsValue::undefined(), args, &mut self.context)
    }

    /// Splits a thrown value into `(name, message, specifier)`.
    fn error_info(&mut self, error: JsError) -> (String, String, Option<String>) {
        let opaque = error.to_opaque(&mut self.context);
        let info = self
            .call_host("errorInfo", &[opaque])
            .ok()
            .and_then(|info| info.as_object().cloned());
        let Some(info) = info else {
            return (String::new(), error.to_string(), None);
        };

        let mut text = |key: &str| {
            info.get(JsString::from(key), &mut self.context)
                .ok()
                .and_then(|value| string_value(&value))
        };
        let name = text("name").unwrap_or_default();
        let message = text("message").unwrap_or_else(|| error.to_string());
        let specifier = text("specifier");
        (name, message, specifier)
    }

    fn failure(&mut self, error: JsError) -> GenerationError {
        let (name, message, specifier) = self.error_info(error);
        if name == MODULE_LOAD_DISABLED {
            return GenerationError::ModuleLoadDisabled {
                file: self.file.clone(),
                specifier: specifier.unwrap_or_default(),
            };
        }

        let message = if name.is_empty() {
            message
        } else {
            format!("{name}: {message}")
        };
        GenerationError::evaluation(&self.file, message)
    }
}

fn install(context: &mut Context) -> JsResult<(JsObject, JsObject)> {
    let factory = context.eval(Source::from_bytes(PRELUDE))?;
    let factory = factory
        .as_callable()
        .cloned()
        .ok_or_else(|| JsNativeError::typ().with_message("prelude is not a function"))?;

    let natives = [
        NativeFunction::from_fn_ptr(host_log),
        NativeFunction::from_fn_ptr(codec::host_encode),
        NativeFunction::from_fn_ptr(codec::host_decode),
    ]
    .map(|function| JsValue::from(function.to_js_function(context.realm())));
    let host = factory.call(&JsValue::undefined(), &natives, context)?;
    let host = host
        .as_object()
        .cloned()
        .ok_or_else(|| JsNativeError::typ().with_message("prelude returned no capabilities"))?;

    let globals = host.get(js_string!("globals"), context)?;
    let globals = globals
        .as_object()
        .cloned()
        .ok_or_else(|| JsNativeError::typ().with_message("prelude returned no globals"))?;

    for name in GLOBALS {
        let value = globals.get(JsString::from(name), context)?;
        context.register_global_property(JsString::from(name), value, Attribute::all())?;
    }

    let module = globals.get(js_string!("module"), context)?;
    let module = module
        .as_object()
        .cloned()
        .ok_or_else(|| JsNativeError::typ().with_message("prelude returned no module object"))?;

    Ok((module, host))
}

/// Receives `console.*` output from template code.
fn host_log(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let level = args.first().and_then(string_value).unwrap_or_default();
    let message = match args.get(1) {
        Some(value) => value.to_string(context)?.to_std_string_escaped(),
        None => String::new(),
    };

    match level.as_str() {
        "error" => error!(target: "packgen::template", "{message}"),
        "warn" => warn!(target: "packgen::template", "{message}"),
        "debug" => debug!(target: "packgen::template", "{message}"),
        "trace" => trace!(target: "packgen::template", "{message}"),
        _ => info!(target: "packgen::template", "{message}"),
    }
    Ok(JsValue::undefined())
}

/// The Rust string of `value` when it is a JavaScript string.
pub(crate) fn string_value(value: &JsValue) -> Option<String> {
    value.as_string().map(|s| s.to_std_string_escaped())
}
