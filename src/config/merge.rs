//! Settings layer merge
//!
//! Layers are merged as JSON values:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge an overlay layer onto a base layer.
///
/// A remote platform declared in both layers keeps the base fields the
/// overlay does not mention, so a project file can override just the port
/// of a user-wide build server entry.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence).
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"language": "en"}), json!({"language": "fr"}));
        assert_eq!(result["language"], "fr");
    }

    #[test]
    fn test_remote_platform_fields_merge() {
        let user = json!({
            "remote_platforms": {
                "ios": {"host": "mac.local", "port": 3000, "secure": true}
            }
        });
        let project = json!({
            "remote_platforms": {
                "ios": {"port": 3100}
            }
        });
        let result = deep_merge(user, project);

        assert_eq!(result["remote_platforms"]["ios"]["host"], "mac.local");
        assert_eq!(result["remote_platforms"]["ios"]["port"], 3100);
        assert_eq!(result["remote_platforms"]["ios"]["secure"], true);
    }

    #[test]
    fn test_new_platform_added() {
        let result = deep_merge(
            json!({"remote_platforms": {"ios": {"host": "a", "port": 1}}}),
            json!({"remote_platforms": {"windows": {"host": "b", "port": 2}}}),
        );
        assert_eq!(result["remote_platforms"]["ios"]["host"], "a");
        assert_eq!(result["remote_platforms"]["windows"]["host"], "b");
    }

    #[test]
    fn test_array_replace() {
        let result = deep_merge(json!({"tags": ["a", "b", "c"]}), json!({"tags": ["x"]}));
        assert_eq!(result["tags"], json!(["x"]));
    }

    #[test]
    fn test_merge_layers_precedence() {
        let result = merge_layers(vec![
            json!({"language": "en", "remote_platforms": {}}),
            json!({"language": "de"}),
            json!({"language": "ja"}),
        ]);
        assert_eq!(result["language"], "ja");
        assert!(result["remote_platforms"].is_object());
    }

    #[test]
    fn test_merge_no_layers_is_null() {
        assert!(merge_layers(Vec::new()).is_null());
    }
}
