//! Dot-path get/set over serde values, shared by [`crate::Settings`] and
//! [`crate::storage::AppConfig`] so the CLI can edit either by key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn parse_like(existing: &Value, key: &str, value: &str) -> Result<Value, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    match existing {
        Value::Bool(_) => value
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|e| invalid(e.to_string())),
        Value::Number(_) => {
            if let Ok(n) = value.parse::<u64>() {
                Ok(Value::Number(n.into()))
            } else if let Ok(n) = value.parse::<f64>() {
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))
            } else {
                Err(invalid(format!("cannot parse '{value}' as number")))
            }
        }
        Value::Array(_) => {
            let trimmed = value.trim();
            if trimmed.starts_with('[') {
                serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()))
            } else {
                // Comma-separated shorthand for string lists.
                Ok(Value::Array(
                    trimmed
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect(),
                ))
            }
        }
        Value::Object(_) => serde_json::from_str(value).map_err(|e| invalid(e.to_string())),
        Value::Null | Value::String(_) => Ok(Value::String(value.to_string())),
    }
}

/// Read `key` from `target`, rendering strings bare and everything else as JSON.
pub fn get<T: Serialize>(target: &T, key: &str) -> Option<String> {
    let json = serde_json::to_value(target).ok()?;
    match lookup(&json, key)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Write `value` at `key`, parsed to match the type already stored there.
///
/// Unknown keys are rejected; the whole value is re-deserialized so serde
/// validation still applies.
pub fn set<T: Serialize + DeserializeOwned>(
    target: &T,
    key: &str,
    value: &str,
) -> Result<T, ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let mut json = serde_json::to_value(target).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;

    let mut parts = key.split('.').peekable();
    if parts.peek().map_or(true, |p| p.is_empty()) {
        return Err(unknown());
    }

    let mut current = &mut json;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = parse_like(existing, key, value)?;
            obj.insert(part.to_string(), new_value);
            break;
        }
        current = current.get_mut(part).ok_or_else(unknown)?;
    }

    serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Inner {
        enabled: bool,
        tags: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Outer {
        name: String,
        count: u32,
        inner: Inner,
    }

    fn sample() -> Outer {
        Outer {
            name: "zoo".into(),
            count: 3,
            inner: Inner {
                enabled: true,
                tags: vec![],
            },
        }
    }

    #[test]
    fn get_renders_strings_bare() {
        let s = sample();
        assert_eq!(get(&s, "name").as_deref(), Some("zoo"));
        assert_eq!(get(&s, "inner.enabled").as_deref(), Some("true"));
        assert!(get(&s, "inner.missing").is_none());
        assert!(get(&s, "").is_none());
    }

    #[test]
    fn set_parses_by_existing_type() {
        let s = set(&sample(), "count", "7").unwrap();
        assert_eq!(s.count, 7);
        let s = set(&s, "inner.enabled", "false").unwrap();
        assert!(!s.inner.enabled);
        let s = set(&s, "inner.tags", "a, b,,c").unwrap();
        assert_eq!(s.inner.tags, vec!["a", "b", "c"]);
        let s = set(&s, "inner.tags", r#"["x"]"#).unwrap();
        assert_eq!(s.inner.tags, vec!["x"]);
    }

    #[test]
    fn set_rejects_unknown_and_mistyped() {
        assert!(matches!(
            set(&sample(), "nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            set(&sample(), "inner.enabled", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        // Negative values fail serde validation for u32.
        assert!(set(&sample(), "count", "-1").is_err());
    }
}
