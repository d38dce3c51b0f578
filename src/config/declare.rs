//! Bundle declarations (`bundles.yaml`).
//!
//! ```yaml
//! app.js:
//!   files: [js/jquery.js, js/app.js]
//! screen.css:
//!   files: [css/reset.css, css/site.css]
//!   media: screen,projection
//! img/logo.png:
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use super::ConfigError;
use crate::bundle::BundleDescriptor;
use crate::error::{BundleError, Result};

/// Record form of one declaration. Unknown keys land in `extra`.
#[derive(Debug, Default, Deserialize)]
struct RawDeclaration {
    #[serde(rename = "type")]
    kind: Option<String>,
    files: Option<Vec<String>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Read and parse the declaration file at `path`.
pub fn read_declarations(path: &Path) -> Result<Vec<BundleDescriptor>> {
    let content =
        fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
    parse_declarations(&content, path)
}

/// Parse declarations, preserving document order.
///
/// `path` is only used for error reporting.
pub fn parse_declarations(content: &str, path: &Path) -> Result<Vec<BundleDescriptor>> {
    let document: Value = serde_yaml::from_str(content).map_err(ConfigError::from)?;

    let mapping = match document {
        Value::Null => return Err(BundleError::NoBundlesDeclared(path.to_path_buf())),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ConfigError::Validation(format!(
                "top level of `{}` must be a mapping, found {}",
                path.display(),
                value_kind(&other)
            ))
            .into());
        }
    };

    if mapping.is_empty() {
        return Err(BundleError::NoBundlesDeclared(path.to_path_buf()));
    }

    let mut descriptors = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Value::String(name) = key else {
            return Err(ConfigError::Validation(format!(
                "bundle names must be strings, found {}",
                value_kind(&key)
            ))
            .into());
        };

        let raw = match value {
            Value::Null => RawDeclaration::default(),
            value @ Value::Mapping(_) => {
                serde_yaml::from_value::<RawDeclaration>(value).map_err(ConfigError::from)?
            }
            other => {
                return Err(ConfigError::Validation(format!(
                    "bundle `{name}` must be a mapping or empty, found {}",
                    value_kind(&other)
                ))
                .into());
            }
        };

        descriptors.push(BundleDescriptor::new(
            name,
            raw.kind.as_deref(),
            raw.files,
            raw.extra,
        ));
    }

    Ok(descriptors)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Vec<BundleDescriptor>> {
        parse_declarations(content, Path::new("bundles.yaml"))
    }

    #[test]
    fn test_parse_preserves_order_and_fields() {
        let descriptors = parse(
            r"
zeta.js:
  files: [js/a.js, js/b.js]
alpha.css:
  files: [css/site.css]
  media: print
logo.png:
vendor:
  type: js
",
        )
        .unwrap();

        let names: Vec<_> = descriptors.iter().map(BundleDescriptor::name).collect();
        assert_eq!(names, ["zeta.js", "alpha.css", "logo.png", "vendor"]);

        assert_eq!(descriptors[0].files(), ["js/a.js", "js/b.js"]);
        assert_eq!(descriptors[1].option_str("media"), Some("print"));
        assert!(!descriptors[1].options().contains_key("files"));
        assert_eq!(descriptors[2].files(), ["logo.png"]);
        assert_eq!(descriptors[3].type_tag(), "js");
    }

    #[test]
    fn test_empty_and_null_documents() {
        assert!(matches!(parse(""), Err(BundleError::NoBundlesDeclared(_))));
        assert!(matches!(parse("~"), Err(BundleError::NoBundlesDeclared(_))));
        assert!(matches!(parse("{}"), Err(BundleError::NoBundlesDeclared(_))));
    }

    #[test]
    fn test_unparsable_document() {
        let err = parse("app.js: [unclosed").unwrap_err();
        assert!(matches!(err, BundleError::Configuration(ConfigError::Yaml(_))));

        let err = parse("- a.js\n- b.js\n").unwrap_err();
        assert!(matches!(err, BundleError::Configuration(ConfigError::Validation(_))));

        let err = parse("app.js: 3\n").unwrap_err();
        assert!(matches!(err, BundleError::Configuration(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = read_declarations(Path::new("/nonexistent/bundles.yaml")).unwrap_err();
        assert!(matches!(err, BundleError::Configuration(ConfigError::Io(..))));
    }
}
