//! JSON schema generation for strict structured outputs.
//!
//! Derives schemas with `schemars` and reshapes them into the form
//! OpenAI's strict mode accepts:
//!
//! 1. `additionalProperties: false` on every object schema
//! 2. every property listed in `required`
//! 3. `$ref` references fully inlined, no `definitions` section

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trait for types usable as a strict structured-output contract.
///
/// Blanket-implemented for anything that is `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Strict-mode JSON schema for this type.
    fn strict_schema() -> Value {
        let mut value = serde_json::to_value(schema_for!(Self)).unwrap_or_default();

        let definitions = match &value {
            Value::Object(map) => map.get("definitions").cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        };

        tighten_objects(&mut value);
        inline_refs(&mut value, &definitions);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        value
    }

    /// Schema name to send alongside the contract.
    fn contract_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Recursively mark object schemas strict: no extra properties, all
/// properties required.
fn tighten_objects(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    if map.get("type") == Some(&Value::String("object".to_string())) {
        map.insert("additionalProperties".to_string(), Value::Bool(false));

        if let Some(Value::Object(props)) = map.get("properties") {
            let required: Vec<Value> =
                props.keys().map(|k| Value::String(k.clone())).collect();
            map.insert("required".to_string(), Value::Array(required));
        }
    }

    for (_, child) in map.iter_mut() {
        match child {
            Value::Object(_) => tighten_objects(child),
            Value::Array(items) => {
                for item in items.iter_mut() {
                    tighten_objects(item);
                }
            }
            _ => {}
        }
    }
}

/// Recursively replace `$ref` nodes with the referenced definition.
fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                let name = reference
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if let Some(def) = definitions.get(&name) {
                    let mut inlined = def.clone();
                    tighten_objects(&mut inlined);
                    inline_refs(&mut inlined, definitions);
                    *value = inlined;
                    return;
                }
            }
            for (_, child) in map.iter_mut() {
                inline_refs(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Inner {
        #[allow(dead_code)]
        name: String,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Outer {
        #[allow(dead_code)]
        items: Vec<Inner>,
        #[allow(dead_code)]
        count: i64,
    }

    #[test]
    fn test_strict_schema_shape() {
        let schema = Outer::strict_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(required.contains(&"items"));
        assert!(required.contains(&"count"));

        // No unresolved refs or definitions left behind
        let rendered = schema.to_string();
        assert!(!rendered.contains("$ref"));
        assert!(!rendered.contains("definitions"));

        // Nested object was inlined and tightened
        let inner = &schema["properties"]["items"]["items"];
        assert_eq!(inner["additionalProperties"], false);
    }

    #[test]
    fn test_link_recommendation_schema_pins_count() {
        use crate::types::links::LinkRecommendation;

        let schema = LinkRecommendation::strict_schema();
        let links = &schema["properties"]["links"];
        assert_eq!(links["minItems"], 20);
        assert_eq!(links["maxItems"], 20);
    }
}
