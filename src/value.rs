//! Resolved values and declared member types
//!
//! A [`Value`] is what the resolver hands to constructors and setters: text
//! literals from a description, bean instances produced by references, and
//! collections of either. A [`ValueType`] is what a constructor parameter or
//! property declares it accepts. [`FromValue`] bridges the two for concrete
//! Rust types.

use crate::{BeanError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased bean instance, shared by every holder of a singleton.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A resolved value.
#[derive(Clone)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A bean produced by resolving a reference
    Bean(Instance),
    List(Vec<Value>),
    /// Entries in declaration order
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Wrap an existing instance as a bean value.
    #[inline]
    pub fn bean<T: Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Value::Bean(instance as Instance)
    }

    /// Short description used in conversion errors.
    pub fn describe(&self) -> String {
        match self {
            Value::Text(s) => format!("text {s:?}"),
            Value::Int(i) => format!("integer {i}"),
            Value::Float(f) => format!("float {f}"),
            Value::Bool(b) => format!("bool {b}"),
            Value::Bean(_) => "bean instance".to_string(),
            Value::List(items) => format!("list of {} element(s)", items.len()),
            Value::Map(entries) => format!("map of {} entr(ies)", entries.len()),
        }
    }

    /// Whether this is a bean of type `T`.
    pub fn is_bean_of<T: 'static>(&self) -> bool {
        matches!(self, Value::Bean(instance) if instance.is::<T>())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Bean(_) => f.write_str("Bean(..)"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
        }
    }
}

impl PartialEq for Value {
    /// Beans compare by identity, everything else by value.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bean(a), Value::Bean(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// The type a constructor parameter or property accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Int,
    Float,
    Bool,
    /// A bean whose concrete type is `type_id`
    Bean {
        type_id: TypeId,
        type_name: &'static str,
    },
    List(Box<ValueType>),
    Map(Box<ValueType>),
    /// Accepts any value unchanged
    Any,
}

impl ValueType {
    /// Bean type descriptor for `T`.
    #[inline]
    pub fn bean<T: 'static>() -> Self {
        ValueType::Bean {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Text => f.write_str("text"),
            ValueType::Int => f.write_str("integer"),
            ValueType::Float => f.write_str("float"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Bean { type_name, .. } => write!(f, "bean {type_name}"),
            ValueType::List(elem) => write!(f, "list<{elem}>"),
            ValueType::Map(elem) => write!(f, "map<text, {elem}>"),
            ValueType::Any => f.write_str("any"),
        }
    }
}

/// Types that can be built from a converted [`Value`].
///
/// `value_type` tells the converter what to produce; `from_value` then
/// extracts the Rust value. Implemented for text, numbers, bools, bean
/// handles (`Arc<T>`), `Option`, `Vec` and `HashMap<String, _>`.
pub trait FromValue: Sized + 'static {
    /// The declared type used for conversion and constructor matching
    fn value_type() -> ValueType;

    /// Extract from an already converted value
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T: FromValue>(value: &Value) -> BeanError {
    BeanError::conversion(value.describe(), T::value_type())
}

impl FromValue for Value {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for String {
    fn value_type() -> ValueType {
        ValueType::Text
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::Int
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i)
                            .map_err(|_| BeanError::conversion(format!("integer {i}"), stringify!($ty))),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for f32 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl<T: Send + Sync + 'static> FromValue for Arc<T> {
    fn value_type() -> ValueType {
        ValueType::bean::<T>()
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bean(instance) => instance
                .downcast::<T>()
                .map_err(|_| BeanError::conversion("bean instance", ValueType::bean::<T>())),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Some)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, value)| T::from_value(value).map(|v| (key, v)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dao;

    #[test]
    fn test_integer_range_is_checked() {
        assert_eq!(u8::from_value(Value::Int(200)).unwrap(), 200);
        let err = u8::from_value(Value::Int(300)).unwrap_err();
        assert!(matches!(err, BeanError::TypeConversion { .. }));
    }

    #[test]
    fn test_bean_downcast() {
        let dao = Arc::new(Dao);
        let value = Value::bean(Arc::clone(&dao));

        assert!(value.is_bean_of::<Dao>());
        let back = Arc::<Dao>::from_value(value).unwrap();
        assert!(Arc::ptr_eq(&dao, &back));

        let wrong = Arc::<String>::from_value(Value::bean(Arc::new(Dao)));
        assert!(wrong.is_err());
    }

    #[test]
    fn test_nested_collections() {
        let value = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(Vec::<i32>::from_value(value).unwrap(), vec![1, 2]);

        let value = Value::Map(vec![("a".into(), Value::Text("x".into()))]);
        let map = HashMap::<String, String>::from_value(value).unwrap();
        assert_eq!(map["a"], "x");
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(Vec::<Option<i64>>::value_type().to_string(), "list<integer>");
        assert_eq!(ValueType::Map(Box::new(ValueType::Text)).to_string(), "map<text, text>");
    }

    #[test]
    fn test_bean_equality_is_identity() {
        let a = Arc::new(Dao);
        assert_eq!(Value::bean(Arc::clone(&a)), Value::bean(Arc::clone(&a)));
        assert_ne!(Value::bean(a), Value::bean(Arc::new(Dao)));
    }
}
