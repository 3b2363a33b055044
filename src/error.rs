//! Error types for bean resolution

use thiserror::Error;

/// Errors that can occur while registering, loading or resolving beans
#[derive(Error, Debug, Clone)]
pub enum BeanError {
    /// No description is registered under the requested id
    #[error("No bean named '{id}' is defined")]
    UnknownBean { id: String },

    /// The bean is declared but could not be built
    #[error("Error creating bean '{id}' of type {type_name}")]
    BeanCreation {
        id: String,
        type_name: String,
        #[source]
        source: Option<Box<BeanError>>,
    },

    /// No declared constructor accepts the supplied arguments
    #[error("No constructor of {type_name} accepts {arity} argument(s)")]
    NoMatchingConstructor { type_name: String, arity: usize },

    /// No arguments were configured and the type has no zero-argument constructor
    #[error("{type_name} declares no zero-argument constructor")]
    NoDefaultConstructor { type_name: String },

    /// A value cannot be coerced to the target type
    #[error("Cannot convert {value} to {target}")]
    TypeConversion { value: String, target: String },

    /// A configured property has no writable member on the type
    #[error("{type_name} has no writable property '{property}'")]
    UnknownProperty { type_name: String, property: String },

    /// Reference cycle between descriptions
    #[error("Circular reference between beans: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// The description names a type that no class was registered for
    #[error("No class registered for type name {type_name}")]
    ClassNotFound { type_name: String },

    /// A typed lookup found an instance of a different type
    #[error("Bean '{id}' is not of required type {expected}")]
    BeanNotOfRequiredType { id: String, expected: &'static str },

    /// A description source could not be read or parsed
    #[error("Invalid bean descriptions in {location}: {reason}")]
    DescriptionStore { location: String, reason: String },
}

impl BeanError {
    /// Create an UnknownBean error
    #[inline]
    pub fn unknown_bean(id: impl Into<String>) -> Self {
        Self::UnknownBean { id: id.into() }
    }

    /// Wrap a failure raised while building bean `id`
    pub fn creation_failed(id: impl Into<String>, type_name: impl Into<String>, cause: BeanError) -> Self {
        Self::BeanCreation {
            id: id.into(),
            type_name: type_name.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a TypeConversion error
    #[inline]
    pub fn conversion(value: impl Into<String>, target: impl std::fmt::Display) -> Self {
        Self::TypeConversion {
            value: value.into(),
            target: target.to_string(),
        }
    }

    /// Create an UnknownProperty error
    #[inline]
    pub fn unknown_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    /// Create a DescriptionStore error
    #[inline]
    pub fn description_store(location: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::DescriptionStore {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// The innermost error beneath any `BeanCreation` wrappers.
    ///
    /// Nested beans wrap their failures once per level, so the failure
    /// kind is found at the bottom of the chain.
    pub fn root_cause(&self) -> &BeanError {
        let mut current = self;
        while let Self::BeanCreation {
            source: Some(cause), ..
        } = current
        {
            current = cause.as_ref();
        }
        current
    }

    /// Whether this error means "bean not declared" rather than "declared but broken"
    #[inline]
    pub fn is_unknown_bean(&self) -> bool {
        matches!(self, Self::UnknownBean { .. })
    }
}

/// Result type alias for bean operations
pub type Result<T> = std::result::Result<T, BeanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_nested_creation() {
        let inner = BeanError::NoMatchingConstructor {
            type_name: "Repo".into(),
            arity: 2,
        };
        let err = BeanError::creation_failed(
            "service",
            "Service",
            BeanError::creation_failed("repo", "Repo", inner),
        );

        assert!(matches!(
            err.root_cause(),
            BeanError::NoMatchingConstructor { arity: 2, .. }
        ));
    }

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = BeanError::CyclicDependency {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular reference between beans: a -> b -> a");
    }

    #[test]
    fn test_creation_keeps_source() {
        use std::error::Error;

        let err = BeanError::creation_failed("a", "A", BeanError::unknown_bean("b"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "No bean named 'b' is defined");
        assert!(!err.is_unknown_bean());
    }

    #[test]
    fn test_creation_message_leaves_cause_to_source() {
        use std::error::Error;

        let err = BeanError::creation_failed(
            "a",
            "A",
            BeanError::creation_failed("b", "B", BeanError::unknown_bean("c")),
        );
        assert_eq!(err.to_string(), "Error creating bean 'a' of type A");

        let mut messages = Vec::new();
        let mut current: Option<&dyn Error> = Some(&err);
        while let Some(e) = current {
            messages.push(e.to_string());
            current = e.source();
        }
        assert_eq!(
            messages,
            vec![
                "Error creating bean 'a' of type A",
                "Error creating bean 'b' of type B",
                "No bean named 'c' is defined",
            ]
        );
    }
}
