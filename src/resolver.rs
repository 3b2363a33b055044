//! Resolution of configured values

use crate::description::ConfigValue;
use crate::factory::BeanFactory;
use crate::value::Value;
use crate::Result;

#[cfg(feature = "logging")]
use tracing::trace;

/// Turns [`ConfigValue`]s into [`Value`]s for one factory.
///
/// Literals pass through as text for the converter to handle. References
/// are resolved through the factory, which may construct the referenced
/// bean (and populate the singleton cache) on the way.
pub struct ValueResolver<'a> {
    factory: &'a BeanFactory,
}

impl<'a> ValueResolver<'a> {
    #[inline]
    pub fn new(factory: &'a BeanFactory) -> Self {
        Self { factory }
    }

    pub fn resolve(&self, raw: &ConfigValue) -> Result<Value> {
        match raw {
            ConfigValue::Literal(text) => Ok(Value::Text(text.clone())),
            ConfigValue::Ref(id) => {
                #[cfg(feature = "logging")]
                trace!(target: "bean_factory", reference = %id, "Resolving bean reference");

                self.factory.resolve_reference(id).map(Value::Bean)
            }
            ConfigValue::List(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            ConfigValue::Map(entries) => entries
                .iter()
                .map(|(key, value)| self.resolve(value).map(|v| (key.clone(), v)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
        }
    }

    /// Resolve every value in order, stopping at the first failure.
    pub fn resolve_all<'v, I>(&self, raws: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = &'v ConfigValue>,
    {
        raws.into_iter().map(|raw| self.resolve(raw)).collect()
    }
}
