//! Constructor selection and invocation

use crate::class::{BeanClass, BoxedInstance, Constructor};
use crate::description::BeanDescription;
use crate::factory::BeanFactory;
use crate::resolver::ValueResolver;
use crate::value::Value;
use crate::{BeanError, Result};

#[cfg(feature = "logging")]
use tracing::trace;

/// Builds the raw instance for a description.
///
/// With configured arguments, the candidates are the constructors whose
/// arity equals the argument count; the first in declaration order whose
/// parameters all accept the resolved arguments is invoked. Without
/// arguments the zero-argument constructor is used.
pub struct ConstructorResolver<'a> {
    factory: &'a BeanFactory,
}

impl<'a> ConstructorResolver<'a> {
    #[inline]
    pub fn new(factory: &'a BeanFactory) -> Self {
        Self { factory }
    }

    pub fn construct(&self, description: &BeanDescription, class: &BeanClass) -> Result<BoxedInstance> {
        if !description.has_constructor_args() {
            return class
                .default_constructor()
                .ok_or_else(|| BeanError::NoDefaultConstructor {
                    type_name: class.name().to_string(),
                })?
                .invoke(Vec::new());
        }

        let resolver = ValueResolver::new(self.factory);
        let args = resolver.resolve_all(description.constructor_args().iter().map(|arg| &arg.value))?;
        self.autowire(class, args)
    }

    /// Pick and invoke the constructor for already resolved arguments.
    pub fn autowire(&self, class: &BeanClass, args: Vec<Value>) -> Result<BoxedInstance> {
        let arity = args.len();
        let candidates: Vec<&Constructor> = class
            .constructors()
            .iter()
            .filter(|c| c.arity() == arity)
            .collect();

        let no_match = || BeanError::NoMatchingConstructor {
            type_name: class.name().to_string(),
            arity,
        };

        match candidates.as_slice() {
            [] => Err(no_match()),
            // A single candidate reports why its arguments did not fit.
            [only] => {
                let converted = self.convert_args(only, &args)?;
                only.invoke(converted)
            }
            many => {
                let converter = self.factory.converter();
                for (_index, candidate) in many.iter().enumerate() {
                    let fits = candidate
                        .params()
                        .iter()
                        .zip(&args)
                        .all(|(param, arg)| converter.can_convert(arg, param));
                    if fits {
                        #[cfg(feature = "logging")]
                        trace!(
                            target: "bean_factory",
                            class = class.name(),
                            arity,
                            candidate = _index,
                            "Selected constructor"
                        );
                        let converted = self.convert_args(candidate, &args)?;
                        return candidate.invoke(converted);
                    }
                }
                Err(no_match())
            }
        }
    }

    fn convert_args(&self, constructor: &Constructor, args: &[Value]) -> Result<Vec<Value>> {
        let converter = self.factory.converter();
        constructor
            .params()
            .iter()
            .zip(args)
            .map(|(param, arg)| converter.convert(arg.clone(), param))
            .collect()
    }
}
