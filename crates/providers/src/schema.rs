//! Response-schema derivation for structured output.
//!
//! The schema is reflected from the Rust type with every subschema inlined,
//! since neither provider resolves `$ref`.

use parley_core::error::ModelBuildError;
use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde_json::Value;

/// A named JSON schema attached to a model as an output constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Identifier sent alongside the schema (`[A-Za-z0-9_-]` only)
    pub name: String,
    pub schema: Value,
}

impl ResponseSchema {
    /// Reflect the schema of `T`.
    pub fn of<T: JsonSchema>() -> Result<Self, ModelBuildError> {
        let type_name = T::schema_name().to_string();
        let fail = |reason: String| ModelBuildError::Schema {
            type_name: type_name.clone(),
            reason,
        };

        let generator = SchemaSettings::draft2020_12()
            .with(|s| s.inline_subschemas = true)
            .into_generator();
        let root = generator.into_root_schema_for::<T>();

        let mut schema = serde_json::to_value(&root).map_err(|e| fail(e.to_string()))?;
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
            obj.remove("$defs");
        }

        // Recursive types cannot be inlined
        if contains_ref(&schema) {
            return Err(fail("schema contains a $ref that cannot be inlined".into()));
        }

        Ok(Self {
            name: sanitize_name(&type_name),
            schema,
        })
    }
}

fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "response".into() } else { cleaned }
}
