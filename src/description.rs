//! Bean descriptions
//!
//! A description is the declarative recipe for one bean: which type to
//! build, with which constructor arguments and property values, and
//! whether the result is shared. Descriptions are immutable once
//! registered with a factory.

use std::fmt;
use std::str::FromStr;

use crate::BeanError;

/// Bean scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// One instance per factory, shared by every requester
    #[default]
    Singleton,

    /// New instance on every request
    Prototype,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Singleton => "singleton",
            Scope::Prototype => "prototype",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = BeanError;

    /// Empty text means the default scope.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "singleton" => Ok(Scope::Singleton),
            "prototype" => Ok(Scope::Prototype),
            other => Err(BeanError::conversion(format!("scope {other:?}"), "singleton|prototype")),
        }
    }
}

/// A configured, not yet resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// Raw text, converted to the member type at injection time
    Literal(String),
    /// Id of another bean
    Ref(String),
    List(Vec<ConfigValue>),
    /// Entries in declaration order
    Map(Vec<(String, ConfigValue)>),
}

impl ConfigValue {
    #[inline]
    pub fn literal(value: impl ToString) -> Self {
        ConfigValue::Literal(value.to_string())
    }

    #[inline]
    pub fn reference(id: impl Into<String>) -> Self {
        ConfigValue::Ref(id.into())
    }

    /// Every bean id referenced by this value, nested collections included.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ConfigValue::Literal(_) => {}
            ConfigValue::Ref(id) => out.push(id),
            ConfigValue::List(items) => items.iter().for_each(|item| item.collect_references(out)),
            ConfigValue::Map(entries) => entries.iter().for_each(|(_, v)| v.collect_references(out)),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Literal(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Literal(value)
    }
}

/// One positional constructor argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub value: ConfigValue,
}

/// One named property assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: String,
    pub value: ConfigValue,
}

/// Declarative recipe for one bean.
///
/// # Examples
///
/// ```rust
/// use bean_factory::{BeanDescription, ConfigValue, Scope};
///
/// let description = BeanDescription::new("petStore", "PetStoreService")
///     .with_scope(Scope::Prototype)
///     .with_constructor_arg(ConfigValue::reference("accountDao"))
///     .with_property("version", "2");
///
/// assert!(description.is_prototype());
/// assert!(description.has_constructor_args());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanDescription {
    id: String,
    type_name: String,
    scope: Scope,
    constructor_args: Vec<ArgumentSpec>,
    properties: Vec<PropertySpec>,
}

impl BeanDescription {
    /// Singleton description with no arguments or properties
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            scope: Scope::Singleton,
            constructor_args: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Append a positional constructor argument
    pub fn with_constructor_arg(mut self, value: impl Into<ConfigValue>) -> Self {
        self.constructor_args.push(ArgumentSpec { value: value.into() });
        self
    }

    /// Append a property assignment
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.properties.push(PropertySpec {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.scope == Scope::Singleton
    }

    #[inline]
    pub fn is_prototype(&self) -> bool {
        self.scope == Scope::Prototype
    }

    #[inline]
    pub fn constructor_args(&self) -> &[ArgumentSpec] {
        &self.constructor_args
    }

    #[inline]
    pub fn has_constructor_args(&self) -> bool {
        !self.constructor_args.is_empty()
    }

    #[inline]
    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    /// Ids this bean refers to, in argument-then-property order.
    pub fn references(&self) -> Vec<&str> {
        self.constructor_args
            .iter()
            .map(|arg| &arg.value)
            .chain(self.properties.iter().map(|prop| &prop.value))
            .flat_map(ConfigValue::references)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("".parse::<Scope>().unwrap(), Scope::Singleton);
        assert_eq!("prototype".parse::<Scope>().unwrap(), Scope::Prototype);
        assert!("request".parse::<Scope>().is_err());
    }

    #[test]
    fn test_defaults() {
        let d = BeanDescription::new("petStore", "PetStoreService");
        assert!(d.is_singleton());
        assert!(!d.has_constructor_args());
        assert!(d.properties().is_empty());
    }

    #[test]
    fn test_references_include_nested_values() {
        let d = BeanDescription::new("a", "A")
            .with_constructor_arg(ConfigValue::reference("b"))
            .with_property(
                "deps",
                ConfigValue::List(vec![
                    ConfigValue::literal("x"),
                    ConfigValue::Map(vec![("k".into(), ConfigValue::reference("c"))]),
                ]),
            )
            .with_property("d", ConfigValue::reference("d"));

        assert_eq!(d.references(), vec!["b", "c", "d"]);
    }
}
