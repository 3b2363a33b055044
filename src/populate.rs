//! Property injection

use crate::class::BeanClass;
use crate::description::BeanDescription;
use crate::factory::BeanFactory;
use crate::resolver::ValueResolver;
use crate::{BeanError, Result};
use std::any::Any;

#[cfg(feature = "logging")]
use tracing::{trace, warn};

/// Writes a description's properties onto a freshly constructed instance.
///
/// Each value is resolved, converted to the member's declared type and
/// written through the member's setter. The first failure stops population
/// and is returned to the caller.
pub struct PropertyPopulator<'a> {
    factory: &'a BeanFactory,
}

impl<'a> PropertyPopulator<'a> {
    #[inline]
    pub fn new(factory: &'a BeanFactory) -> Self {
        Self { factory }
    }

    pub fn populate(
        &self,
        description: &BeanDescription,
        class: &BeanClass,
        instance: &mut (dyn Any + Send + Sync),
    ) -> Result<()> {
        if description.properties().is_empty() {
            return Ok(());
        }

        let resolver = ValueResolver::new(self.factory);
        let converter = self.factory.converter();

        for property in description.properties() {
            let descriptor = match class.property(&property.name) {
                Some(descriptor) if descriptor.is_writable() => descriptor,
                _ if self.factory.ignores_unknown_properties() => {
                    #[cfg(feature = "logging")]
                    warn!(
                        target: "bean_factory",
                        bean = description.id(),
                        class = class.name(),
                        property = %property.name,
                        "Skipping property with no writable member"
                    );
                    continue;
                }
                _ => return Err(BeanError::unknown_property(class.name(), &property.name)),
            };

            let value = resolver.resolve(&property.value)?;
            let value = converter.convert(value, descriptor.value_type())?;
            class.set_member(instance, &property.name, value)?;

            #[cfg(feature = "logging")]
            trace!(
                target: "bean_factory",
                bean = description.id(),
                property = %property.name,
                "Property injected"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::BoxedInstance;
    use crate::{BeanFactory, ConfigValue};
    use std::sync::Arc;

    #[derive(Default)]
    struct Dao;

    #[derive(Default)]
    struct Service {
        dao: Option<Arc<Dao>>,
        retries: u32,
        tags: Vec<String>,
    }

    fn service_class() -> BeanClass {
        BeanClass::builder::<Service>("Service")
            .constructor(Service::default)
            .property("dao", |s: &mut Service, v: Arc<Dao>| s.dao = Some(v))
            .property("retries", |s: &mut Service, v: u32| s.retries = v)
            .property("tags", |s: &mut Service, v: Vec<String>| s.tags = v)
            .build()
    }

    fn factory(lenient: bool) -> BeanFactory {
        let factory = BeanFactory::builder().ignore_unknown_properties(lenient).build();
        factory.register_class(BeanClass::builder::<Dao>("Dao").constructor(Dao::default).build());
        factory.register_class(service_class());
        factory.register_description(BeanDescription::new("dao", "Dao"));
        factory
    }

    fn populate(factory: &BeanFactory, description: &BeanDescription) -> Result<Service> {
        let mut instance: BoxedInstance = Box::new(Service::default());
        PropertyPopulator::new(factory).populate(description, &service_class(), instance.as_mut())?;
        Ok(*instance.downcast::<Service>().unwrap())
    }

    #[test]
    fn test_values_are_converted_and_written() {
        let factory = factory(false);
        let d = BeanDescription::new("svc", "Service")
            .with_property("dao", ConfigValue::reference("dao"))
            .with_property("retries", "3")
            .with_property("tags", "a, b");

        let service = populate(&factory, &d).unwrap();
        let dao = factory.get_bean_as::<Dao>("dao").unwrap();

        assert!(Arc::ptr_eq(service.dao.as_ref().unwrap(), &dao));
        assert_eq!(service.retries, 3);
        assert_eq!(service.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_unknown_property_fails() {
        let factory = factory(false);
        let d = BeanDescription::new("svc", "Service").with_property("colour", "red");
        let err = populate(&factory, &d).err().unwrap();
        assert!(matches!(err, BeanError::UnknownProperty { ref property, .. } if property == "colour"));
    }

    #[test]
    fn test_unknown_property_skipped_when_lenient() {
        let factory = factory(true);
        let d = BeanDescription::new("svc", "Service")
            .with_property("colour", "red")
            .with_property("retries", "5");
        assert_eq!(populate(&factory, &d).unwrap().retries, 5);
    }

    #[test]
    fn test_conversion_failure_propagates() {
        let factory = factory(false);
        let d = BeanDescription::new("svc", "Service").with_property("retries", "-1");
        let err = populate(&factory, &d).err().unwrap();
        assert!(matches!(err, BeanError::TypeConversion { .. }));
    }
}
