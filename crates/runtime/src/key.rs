//! Cache keys: operation plus a stable rendering of its parameters.

use std::collections::BTreeMap;
use std::fmt;

use contentgen_common::camel_case;
use serde_json::{Map, Value};

/// Identity of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    operation_id: String,
    parameters: String,
}

impl CacheKey {
    /// `operation_id` is camel-cased; parameters go through
    /// [`stable_parameters`].
    pub fn new(operation_id: &str, parameters: &Value) -> Self {
        CacheKey {
            operation_id: camel_case(operation_id),
            parameters: stable_parameters(parameters),
        }
    }

    /// Camel-cased operation id.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Stable rendering of the parameters.
    pub fn parameters(&self) -> &str {
        &self.parameters
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation_id, self.parameters)
    }
}

/// Null is empty, strings are raw, other scalars use their JSON text and
/// containers become JSON with object keys sorted at every level.
pub fn stable_parameters(parameters: &Value) -> String {
    match parameters {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => parameters.to_string(),
        Value::Array(_) | Value::Object(_) => canonical(parameters).to_string(),
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical(v))).collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_key_order_does_not_matter() {
        let a = CacheKey::new("find-one", &json!({ "id": 1, "populate": { "b": true, "a": [2, 1] } }));
        let b = CacheKey::new("findOne", &json!({ "populate": { "a": [2, 1], "b": true }, "id": 1 }));

        assert_eq!(a, b);
        assert_eq!(a.to_string(), r#"findOne:{"id":1,"populate":{"a":[2,1],"b":true}}"#);
    }

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(stable_parameters(&Value::Null), "");
        assert_eq!(stable_parameters(&json!("slug")), "slug");
        assert_eq!(stable_parameters(&json!(7)), "7");
        assert_eq!(stable_parameters(&json!(false)), "false");
        assert_ne!(CacheKey::new("get", &json!(1)), CacheKey::new("get", &json!(2)));
    }
}
