//! Type conversion between resolved values and declared member types

use crate::value::{Value, ValueType};
use crate::{BeanError, Result};

/// Converts a resolved value into the shape a member declares.
///
/// The factory calls this once per constructor argument and property
/// before invoking the accessor. Implementations must be thread-safe since
/// a factory is shared across threads.
pub trait TypeConverter: Send + Sync {
    /// Convert `value` so that it satisfies `target`
    fn convert(&self, value: Value, target: &ValueType) -> Result<Value>;

    /// Whether `value` can be converted to `target`.
    ///
    /// When several constructors share the requested arity, each candidate
    /// is probed with this in declaration order and only the chosen one is
    /// converted. Override it when a cheaper check than a full conversion
    /// exists.
    fn can_convert(&self, value: &Value, target: &ValueType) -> bool {
        self.convert(value.clone(), target).is_ok()
    }
}

/// Default converter for text-sourced descriptions.
///
/// - text parses into integers, floats and bools
///   (`true/false`, `yes/no`, `on/off`, `1/0`, case-insensitive)
/// - scalars render back to text
/// - integers widen to floats, never the other way
/// - comma-separated text splits into a list
/// - lists and maps convert element-wise
/// - beans pass through when their concrete type matches
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTypeConverter;

impl SimpleTypeConverter {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    fn parse_bool(text: &str) -> Option<bool> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl TypeConverter for SimpleTypeConverter {
    fn convert(&self, value: Value, target: &ValueType) -> Result<Value> {
        let fail = |value: &Value| BeanError::conversion(value.describe(), target);

        match (value, target) {
            (value, ValueType::Any) => Ok(value),

            (Value::Text(s), ValueType::Text) => Ok(Value::Text(s)),
            (Value::Int(i), ValueType::Text) => Ok(Value::Text(i.to_string())),
            (Value::Float(x), ValueType::Text) => Ok(Value::Text(x.to_string())),
            (Value::Bool(b), ValueType::Text) => Ok(Value::Text(b.to_string())),

            (Value::Int(i), ValueType::Int) => Ok(Value::Int(i)),
            (Value::Text(s), ValueType::Int) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => Err(fail(&Value::Text(s))),
            },

            (Value::Float(x), ValueType::Float) => Ok(Value::Float(x)),
            (Value::Int(i), ValueType::Float) => Ok(Value::Float(i as f64)),
            (Value::Text(s), ValueType::Float) => match s.trim().parse::<f64>() {
                Ok(x) => Ok(Value::Float(x)),
                Err(_) => Err(fail(&Value::Text(s))),
            },

            (Value::Bool(b), ValueType::Bool) => Ok(Value::Bool(b)),
            (Value::Text(s), ValueType::Bool) => match Self::parse_bool(&s) {
                Some(b) => Ok(Value::Bool(b)),
                None => Err(fail(&Value::Text(s))),
            },

            (Value::Bean(instance), ValueType::Bean { type_id, .. }) => {
                if (*instance).type_id() == *type_id {
                    Ok(Value::Bean(instance))
                } else {
                    Err(fail(&Value::Bean(instance)))
                }
            }

            (Value::List(items), ValueType::List(elem)) => items
                .into_iter()
                .map(|item| self.convert(item, elem))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (Value::Text(s), ValueType::List(elem)) => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| self.convert(Value::Text(part.to_string()), elem))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),

            (Value::Map(entries), ValueType::Map(elem)) => entries
                .into_iter()
                .map(|(key, value)| self.convert(value, elem).map(|v| (key, v)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),

            (value, _) => Err(fail(&value)),
        }
    }
}
