use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar value in the condition language and the variable store.
///
/// Serialization is untagged, so a variable store round-trips through JSON
/// as plain scalars. `Undefined` exists only at evaluation time (an absent
/// variable); stores should remove a key rather than persist `Undefined`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A number (authored literals are all f64).
    Number(f64),
    /// A string.
    Str(String),
    /// An explicit null.
    Null,
    /// An absent value: the result of looking up an unset variable.
    #[default]
    Undefined,
}

impl Value {
    /// Truthiness: `false`, `0`, `NaN`, `""`, `null`, and `undefined` are
    /// falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Null | Value::Undefined => false,
        }
    }

    /// Loose equality: `undefined == null` holds; otherwise values are equal
    /// only within the same variant. Cross-type comparisons are false, never
    /// coerced.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }

    /// The value's numeric content, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// A short name for the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Read access to a variable store.
///
/// Looking up an unset variable yields [`Value::Undefined`]; this is how
/// conditions like `flag == true` fail gracefully before `flag` is set.
pub trait Variables {
    /// Look up a variable by name.
    fn get(&self, name: &str) -> Value;
}

impl Variables for std::collections::HashMap<String, Value> {
    fn get(&self, name: &str) -> Value {
        std::collections::HashMap::get(self, name)
            .cloned()
            .unwrap_or_default()
    }
}

impl Variables for std::collections::BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Value {
        std::collections::BTreeMap::get(self, name)
            .cloned()
            .unwrap_or_default()
    }
}

/// The empty store: every lookup is `Undefined`.
impl Variables for () {
    fn get(&self, _name: &str) -> Value {
        Value::Undefined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(1.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Undefined.is_truthy());
    }

    #[test]
    fn loose_equality_absent_values() {
        assert!(Value::Undefined.loose_eq(&Value::Null));
        assert!(Value::Null.loose_eq(&Value::Undefined));
        assert!(Value::Null.loose_eq(&Value::Null));
    }

    #[test]
    fn loose_equality_no_coercion() {
        assert!(!Value::Number(1.0).loose_eq(&Value::Bool(true)));
        assert!(!Value::Str("1".into()).loose_eq(&Value::Number(1.0)));
        assert!(!Value::Bool(false).loose_eq(&Value::Null));
    }

    #[test]
    fn untagged_serialization() {
        assert_eq!(serde_json::to_string(&Value::Number(2.5)).unwrap(), "2.5");
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&Value::Str("hi".into())).unwrap(),
            "\"hi\""
        );
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn missing_variable_is_undefined() {
        let vars: BTreeMap<String, Value> = BTreeMap::new();
        assert_eq!(Variables::get(&vars, "nope"), Value::Undefined);
    }
}
