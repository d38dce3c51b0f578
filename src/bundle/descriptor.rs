//! Declared identity of a bundle.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// One bundle as declared in `bundles.yaml`. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleDescriptor {
    name: String,
    type_tag: String,
    files: Vec<String>,
    options: BTreeMap<String, Value>,
}

impl BundleDescriptor {
    /// Build a descriptor, resolving the type tag and default member list.
    ///
    /// An explicit `type` wins over the extension inferred from `name`.
    /// A missing or empty `files` list means the bundle is the single file
    /// named after the bundle.
    pub fn new(
        name: impl Into<String>,
        explicit_type: Option<&str>,
        files: Option<Vec<String>>,
        options: BTreeMap<String, Value>,
    ) -> Self {
        let name = name.into();
        let type_tag = match explicit_type {
            Some(tag) => tag.trim().to_ascii_lowercase(),
            None => infer_type(&name),
        };
        let files = match files {
            Some(files) if !files.is_empty() => files,
            _ => vec![name.clone()],
        };
        Self {
            name,
            type_tag,
            files,
            options,
        }
    }

    /// Shorthand for a descriptor with inferred type and no options.
    pub fn simple(name: impl Into<String>, files: &[&str]) -> Self {
        let files = files.iter().map(|f| (*f).to_string()).collect();
        Self::new(name, None, Some(files), BTreeMap::new())
    }

    /// Logical bundle name (e.g. `app.js`, `img/logo.png`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved type tag (`js`, `css`, `png`, `ico`, ...).
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Member files relative to the media root, in declared order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Type-specific extra fields (e.g. `media` for stylesheets).
    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    /// String value of an extra field, if present and scalar.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Whether `file` (relative to the media root) is a member.
    pub fn contains(&self, file: &str) -> bool {
        self.files.iter().any(|f| f == file)
    }
}

/// Lowercased text after the last `.` of a bundle name, or empty.
pub fn infer_type(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_inferred_from_extension() {
        let desc = BundleDescriptor::simple("js/App.JS", &["a.js"]);
        assert_eq!(desc.type_tag(), "js");
        assert_eq!(infer_type("noext"), "");
    }

    #[test]
    fn test_explicit_type_wins() {
        let desc = BundleDescriptor::new("vendor.bundle", Some("CSS"), None, BTreeMap::new());
        assert_eq!(desc.type_tag(), "css");
    }

    #[test]
    fn test_files_default_to_name() {
        let desc = BundleDescriptor::new("logo.png", None, None, BTreeMap::new());
        assert_eq!(desc.files(), ["logo.png"]);

        let desc = BundleDescriptor::new("logo.png", None, Some(Vec::new()), BTreeMap::new());
        assert_eq!(desc.files(), ["logo.png"]);
    }

    #[test]
    fn test_option_str() {
        let mut options = BTreeMap::new();
        options.insert("media".to_string(), Value::from("print"));
        options.insert("weight".to_string(), Value::from(3));
        let desc = BundleDescriptor::new("print.css", None, None, options);
        assert_eq!(desc.option_str("media"), Some("print"));
        assert_eq!(desc.option_str("weight"), None);
        assert!(desc.contains("print.css"));
    }
}
