//! Description sources
//!
//! A source yields [`BeanDescription`]s for a factory to register. Lists
//! built in code are sources; with the `toml` and `json` features, so are
//! configuration files:
//!
//! ```toml
//! [[bean]]
//! id = "accountDao"
//! class = "AccountDao"
//!
//! [[bean]]
//! id = "petStore"
//! class = "PetStoreService"
//! scope = "singleton"
//!
//! [[bean.constructor-arg]]
//! ref = "accountDao"
//!
//! [[bean.property]]
//! name = "categories"
//! list = ["dogs", "cats", { ref = "birds" }]
//!
//! [[bean.property]]
//! name = "limits"
//! map = [{ key = "daily", value = 10 }]
//! ```
//!
//! Every argument, property, list element and map entry carries exactly
//! one of `value`, `ref`, `list` or `map`. A bare scalar in a list is
//! shorthand for `{ value = ... }`.

use crate::Result;
use crate::description::BeanDescription;

/// Anything that can produce bean descriptions.
pub trait DescriptionSource {
    /// Read every description. Unreadable or malformed input fails with
    /// [`BeanError::DescriptionStore`](crate::BeanError::DescriptionStore).
    fn load_descriptions(&self) -> Result<Vec<BeanDescription>>;
}

impl DescriptionSource for [BeanDescription] {
    fn load_descriptions(&self) -> Result<Vec<BeanDescription>> {
        Ok(self.to_vec())
    }
}

impl DescriptionSource for Vec<BeanDescription> {
    fn load_descriptions(&self) -> Result<Vec<BeanDescription>> {
        Ok(self.clone())
    }
}

/// Read a description file, choosing the format by extension
/// (`.toml` or `.json`).
#[cfg(any(feature = "toml", feature = "json"))]
pub fn load_path(path: impl AsRef<std::path::Path>) -> Result<Vec<BeanDescription>> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        #[cfg(feature = "toml")]
        Some("toml") => TomlSource::from_path(path)?.load_descriptions(),
        #[cfg(feature = "json")]
        Some("json") => JsonSource::from_path(path)?.load_descriptions(),
        other => Err(crate::BeanError::description_store(
            path.display().to_string(),
            format!("unsupported description format {:?}", other.unwrap_or("")),
        )),
    }
}

/// TOML description document
#[cfg(feature = "toml")]
#[derive(Debug, Clone)]
pub struct TomlSource {
    location: String,
    text: String,
}

#[cfg(feature = "toml")]
impl TomlSource {
    /// Source over in-memory TOML text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            location: "<toml>".to_string(),
            text: text.into(),
        }
    }

    /// Read a TOML file; its path is used in error messages.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let (location, text) = raw::read(path.as_ref())?;
        Ok(Self { location, text })
    }
}

#[cfg(feature = "toml")]
impl DescriptionSource for TomlSource {
    fn load_descriptions(&self) -> Result<Vec<BeanDescription>> {
        let document: raw::Document = toml::from_str(&self.text)
            .map_err(|e| crate::BeanError::description_store(&self.location, e))?;
        document.into_descriptions(&self.location)
    }
}

/// JSON description document, `{"bean": [...]}` with the same keys as the
/// TOML form
#[cfg(feature = "json")]
#[derive(Debug, Clone)]
pub struct JsonSource {
    location: String,
    text: String,
}

#[cfg(feature = "json")]
impl JsonSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            location: "<json>".to_string(),
            text: text.into(),
        }
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let (location, text) = raw::read(path.as_ref())?;
        Ok(Self { location, text })
    }
}

#[cfg(feature = "json")]
impl DescriptionSource for JsonSource {
    fn load_descriptions(&self) -> Result<Vec<BeanDescription>> {
        let document: raw::Document = serde_json::from_str(&self.text)
            .map_err(|e| crate::BeanError::description_store(&self.location, e))?;
        document.into_descriptions(&self.location)
    }
}

/// Serde shape shared by the file formats
#[cfg(any(feature = "toml", feature = "json"))]
mod raw {
    use crate::description::{BeanDescription, ConfigValue, Scope};
    use crate::{BeanError, Result};
    use serde::Deserialize;
    use std::path::Path;

    #[cfg(feature = "logging")]
    use tracing::debug;

    pub(super) fn read(path: &Path) -> Result<(String, String)> {
        let location = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BeanError::description_store(&location, e))?;
        Ok((location, text))
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub(super) struct Document {
        #[serde(default, rename = "bean")]
        beans: Vec<Bean>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Bean {
        id: String,
        class: String,
        #[serde(default)]
        scope: Option<String>,
        #[serde(default, rename = "constructor-arg")]
        constructor_args: Vec<Node>,
        #[serde(default, rename = "property")]
        properties: Vec<Node>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Node {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        value: Option<Scalar>,
        #[serde(default, rename = "ref")]
        reference: Option<String>,
        #[serde(default)]
        list: Option<Vec<Element>>,
        #[serde(default)]
        map: Option<Vec<Node>>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum Element {
        Scalar(Scalar),
        Node(Node),
    }

    impl Scalar {
        fn into_text(self) -> String {
            match self {
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(x) => x.to_string(),
                Scalar::Text(s) => s,
            }
        }
    }

    impl Document {
        pub(super) fn into_descriptions(self, location: &str) -> Result<Vec<BeanDescription>> {
            let descriptions = self
                .beans
                .into_iter()
                .map(|bean| bean.into_description(location))
                .collect::<Result<Vec<_>>>()?;

            #[cfg(feature = "logging")]
            debug!(
                target: "bean_factory",
                location,
                count = descriptions.len(),
                "Loaded bean descriptions"
            );

            Ok(descriptions)
        }
    }

    impl Bean {
        fn into_description(self, location: &str) -> Result<BeanDescription> {
            let fail = |what: String| BeanError::description_store(location, format!("bean '{}': {what}", self.id));

            let scope = self
                .scope
                .as_deref()
                .unwrap_or_default()
                .parse::<Scope>()
                .map_err(|e| fail(e.to_string()))?;

            let mut description = BeanDescription::new(&self.id, &self.class).with_scope(scope);

            for (index, arg) in self.constructor_args.into_iter().enumerate() {
                if arg.name.is_some() || arg.key.is_some() {
                    return Err(fail(format!("constructor-arg {index} is positional and takes no name or key")));
                }
                let value = arg.into_value().map_err(|e| fail(format!("constructor-arg {index}: {e}")))?;
                description = description.with_constructor_arg(value);
            }

            for property in self.properties {
                let Some(name) = property.name.clone() else {
                    return Err(fail("property without a name".to_string()));
                };
                let value = property.into_value().map_err(|e| fail(format!("property '{name}': {e}")))?;
                description = description.with_property(name, value);
            }

            Ok(description)
        }
    }

    impl Node {
        fn into_value(self) -> std::result::Result<ConfigValue, String> {
            let kinds = [
                self.value.is_some(),
                self.reference.is_some(),
                self.list.is_some(),
                self.map.is_some(),
            ];
            if kinds.iter().filter(|set| **set).count() != 1 {
                return Err("exactly one of value, ref, list or map is required".to_string());
            }

            if let Some(value) = self.value {
                return Ok(ConfigValue::Literal(value.into_text()));
            }
            if let Some(id) = self.reference {
                return Ok(ConfigValue::Ref(id));
            }
            if let Some(items) = self.list {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Element::Scalar(value) => Ok(ConfigValue::Literal(value.into_text())),
                        Element::Node(node) => node.into_value(),
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(ConfigValue::List);
            }

            let entries = self.map.unwrap_or_default();
            entries
                .into_iter()
                .map(|entry| {
                    let Some(key) = entry.key.clone() else {
                        return Err("map entry without a key".to_string());
                    };
                    entry.into_value().map(|value| (key, value))
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(ConfigValue::Map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_list_is_a_source() {
        let list = vec![BeanDescription::new("a", "A"), BeanDescription::new("b", "B")];
        assert_eq!(list.load_descriptions().unwrap(), list);
        assert_eq!(list[..1].load_descriptions().unwrap().len(), 1);
    }

    #[cfg(feature = "toml")]
    mod toml_source {
        use super::*;
        use crate::{BeanError, ConfigValue, Scope};
        use std::io::Write;

        const PET_STORE: &str = r#"
            [[bean]]
            id = "accountDao"
            class = "AccountDao"

            [[bean]]
            id = "petStore"
            class = "PetStoreService"
            scope = "prototype"

            [[bean.constructor-arg]]
            ref = "accountDao"

            [[bean.constructor-arg]]
            value = 3

            [[bean.property]]
            name = "categories"
            list = ["dogs", { ref = "birds" }]

            [[bean.property]]
            name = "limits"
            map = [{ key = "daily", value = "10" }, { key = "weekly", list = [true] }]
        "#;

        #[test]
        fn test_reads_every_value_kind() {
            let descriptions = TomlSource::new(PET_STORE).load_descriptions().unwrap();
            assert_eq!(descriptions.len(), 2);

            let dao = &descriptions[0];
            assert_eq!(dao.id(), "accountDao");
            assert_eq!(dao.scope(), Scope::Singleton);

            let expected = BeanDescription::new("petStore", "PetStoreService")
                .with_scope(Scope::Prototype)
                .with_constructor_arg(ConfigValue::reference("accountDao"))
                .with_constructor_arg("3")
                .with_property(
                    "categories",
                    ConfigValue::List(vec!["dogs".into(), ConfigValue::reference("birds")]),
                )
                .with_property(
                    "limits",
                    ConfigValue::Map(vec![
                        ("daily".into(), "10".into()),
                        ("weekly".into(), ConfigValue::List(vec!["true".into()])),
                    ]),
                );
            assert_eq!(descriptions[1], expected);
        }

        #[test]
        fn test_rejects_ambiguous_value() {
            let err = TomlSource::new(
                r#"
                [[bean]]
                id = "a"
                class = "A"
                [[bean.property]]
                name = "x"
                value = "1"
                ref = "b"
                "#,
            )
            .load_descriptions()
            .unwrap_err();

            match err {
                BeanError::DescriptionStore { reason, .. } => {
                    assert!(reason.contains("bean 'a'"));
                    assert!(reason.contains("property 'x'"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn test_rejects_bad_scope_and_syntax() {
            let bad_scope = TomlSource::new("[[bean]]\nid = \"a\"\nclass = \"A\"\nscope = \"session\"\n");
            assert!(matches!(
                bad_scope.load_descriptions(),
                Err(BeanError::DescriptionStore { .. })
            ));

            let broken = TomlSource::new("[[bean]\nid = ");
            assert!(matches!(
                broken.load_descriptions(),
                Err(BeanError::DescriptionStore { ref location, .. }) if location == "<toml>"
            ));
        }

        #[test]
        fn test_load_path_by_extension() {
            let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            file.write_all(PET_STORE.as_bytes()).unwrap();

            let descriptions = load_path(file.path()).unwrap();
            assert_eq!(descriptions.len(), 2);

            let err = load_path(file.path().with_extension("yaml")).unwrap_err();
            assert!(matches!(err, BeanError::DescriptionStore { .. }));
        }

        #[test]
        fn test_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("beans.toml");
            let err = TomlSource::from_path(&path).unwrap_err();
            assert!(matches!(err, BeanError::DescriptionStore { location, .. } if location == path.display().to_string()));
        }
    }

    #[cfg(feature = "json")]
    mod json_source {
        use super::*;
        use crate::ConfigValue;

        #[test]
        fn test_reads_json_document() {
            let source = JsonSource::new(
                r#"{
                    "bean": [
                        { "id": "b", "class": "B" },
                        {
                            "id": "a",
                            "class": "A",
                            "property": [
                                { "name": "dep", "ref": "b" },
                                { "name": "ratio", "value": 0.5 }
                            ]
                        }
                    ]
                }"#,
            );

            let descriptions = source.load_descriptions().unwrap();
            assert_eq!(descriptions.len(), 2);
            assert_eq!(descriptions[1].references(), vec!["b"]);
            assert_eq!(descriptions[1].properties()[1].value, ConfigValue::literal("0.5"));
        }

        #[test]
        fn test_unknown_field_rejected() {
            let source = JsonSource::new(r#"{ "bean": [{ "id": "a", "class": "A", "lazy": true }] }"#);
            assert!(source.load_descriptions().is_err());
        }
    }
}
