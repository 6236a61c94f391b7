//! Classification of a template's default export

use crate::generation::{GenerationError, TemplateInstance, ValueRef, ValueShape};

/// The two accepted shapes of a default export, plus everything else
#[derive(Debug, PartialEq, Eq)]
pub enum ExportedContract {
    /// A plain object written as `<baseName>.json`
    SingleArtifact { data: ValueRef },
    /// `[nameFn, dataFn, items]`, one artifact per item
    MultiArtifact {
        name_fn: ValueRef,
        data_fn: ValueRef,
        items: Vec<ValueRef>,
    },
    Invalid { found: String },
}

impl ExportedContract {
    /// Classifies `value`. A 3-element array with misplaced members is a
    /// [`GenerationError::Contract`]; any other unexpected shape is `Invalid`.
    pub fn classify(
        value: ValueRef,
        instance: &mut dyn TemplateInstance,
        file: &str,
    ) -> Result<Self, GenerationError> {
        let elements = match instance.inspect(value)? {
            ValueShape::Object => return Ok(Self::SingleArtifact { data: value }),
            ValueShape::Array(elements) => elements,
            other => {
                return Ok(Self::Invalid {
                    found: other.describe(),
                });
            }
        };

        let [name_fn, data_fn, items] = match <[ValueRef; 3]>::try_from(elements) {
            Ok(triple) => triple,
            Err(elements) => {
                return Ok(Self::Invalid {
                    found: ValueShape::Array(elements).describe(),
                });
            }
        };

        if instance.inspect(name_fn)? != ValueShape::Function {
            return Err(GenerationError::contract(
                file,
                "First element must be a function that returns a filename.",
            ));
        }
        if instance.inspect(data_fn)? != ValueShape::Function {
            return Err(GenerationError::contract(
                file,
                "Second element must be a function that returns JSON data.",
            ));
        }
        let ValueShape::Array(items) = instance.inspect(items)? else {
            return Err(GenerationError::contract(
                file,
                "Third element must be an array of items to generate from.",
            ));
        };

        Ok(Self::MultiArtifact {
            name_fn,
            data_fn,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Values laid out by hand; index 0 is the default export
    struct FakeInstance {
        shapes: Vec<ValueShape>,
    }

    impl TemplateInstance for FakeInstance {
        fn default_export(&self) -> ValueRef {
            ValueRef(0)
        }

        fn inspect(&mut self, value: ValueRef) -> Result<ValueShape, GenerationError> {
            self.shapes
                .get(value.0)
                .cloned()
                .ok_or_else(|| GenerationError::evaluation("BP/t.ts", "unknown value"))
        }

        fn call(&mut self, _function: ValueRef, _argument: ValueRef) -> Result<ValueRef, GenerationError> {
            Err(GenerationError::evaluation("BP/t.ts", "not callable here"))
        }

        fn string(&mut self, _value: ValueRef) -> Option<String> {
            None
        }

        fn to_json(&mut self, _value: ValueRef, _indent: Option<usize>) -> Result<String, GenerationError> {
            Ok("{}".to_string())
        }
    }

    fn array(indices: &[usize]) -> ValueShape {
        ValueShape::Array(indices.iter().copied().map(ValueRef).collect())
    }

    fn classify(shapes: Vec<ValueShape>) -> Result<ExportedContract, GenerationError> {
        let mut instance = FakeInstance { shapes };
        let value = instance.default_export();
        ExportedContract::classify(value, &mut instance, "BP/t.ts")
    }

    #[test]
    fn test_plain_object_is_single_artifact() {
        let contract = classify(vec![ValueShape::Object]).unwrap();
        assert_eq!(contract, ExportedContract::SingleArtifact { data: ValueRef(0) });
    }

    #[test]
    fn test_triple_is_multi_artifact() {
        let contract = classify(vec![
            array(&[1, 2, 3]),
            ValueShape::Function,
            ValueShape::Function,
            array(&[4, 5]),
            ValueShape::Object,
            ValueShape::Other("a number".to_string()),
        ])
        .unwrap();
        assert_eq!(
            contract,
            ExportedContract::MultiArtifact {
                name_fn: ValueRef(1),
                data_fn: ValueRef(2),
                items: vec![ValueRef(4), ValueRef(5)],
            }
        );
    }

    #[test]
    fn test_other_shapes_are_invalid() {
        let cases = [
            (vec![array(&[1, 1]), ValueShape::Function], "an array of length 2"),
            (vec![array(&[])], "an array of length 0"),
            (vec![ValueShape::Function], "a function"),
            (vec![ValueShape::Other("undefined".to_string())], "undefined"),
        ];
        for (shapes, expected) in cases {
            match classify(shapes).unwrap() {
                ExportedContract::Invalid { found } => assert_eq!(found, expected),
                other => panic!("Expected Invalid for {expected}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_misplaced_members_name_the_position() {
        let function = || ValueShape::Function;
        let text = || ValueShape::Other("a string".to_string());
        let cases = [
            (vec![array(&[1, 2, 3]), text(), function(), array(&[])], "First element"),
            (vec![array(&[1, 2, 3]), function(), ValueShape::Object, array(&[])], "Second element"),
            (vec![array(&[1, 2, 3]), function(), function(), ValueShape::Object], "Third element"),
        ];
        for (shapes, expected) in cases {
            match classify(shapes) {
                Err(GenerationError::Contract { file, message }) => {
                    assert_eq!(file, "BP/t.ts");
                    assert!(message.starts_with(expected), "{message}");
                }
                other => panic!("Expected Contract error for {expected}, got {:?}", other),
            }
        }
    }
}
