//! Type tag → bundle factory table.
//!
//! Factories are registered explicitly; [`Registry::with_defaults`] installs
//! the built-in script, stylesheet, image and icon variants.

use rustc_hash::FxHashMap;

use super::{Bundle, BundleDescriptor, BundleKind, BundleTable, DEFAULT_MEDIA};
use crate::config::{Settings, read_declarations};
use crate::debug;
use crate::error::{BundleError, Result};

/// Resolves a descriptor into its bundle kind, enforcing type constraints.
pub type Factory = fn(&BundleDescriptor) -> Result<BundleKind>;

/// Tags handled by the image variant.
const IMAGE_TAGS: &[&str] = &["img", "gif", "jpg", "jpeg", "png", "svg", "webp"];

#[derive(Debug, Clone, Default)]
pub struct Registry {
    factories: FxHashMap<String, Factory>,
}

impl Registry {
    /// Registry without any variants.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in variants.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("js", script).register("css", stylesheet);
        for tag in IMAGE_TAGS {
            registry.register(tag, image);
        }
        registry.register("ico", icon);
        registry
    }

    /// Register (or replace) the factory for `tag`.
    pub fn register(&mut self, tag: &str, factory: Factory) -> &mut Self {
        self.factories.insert(tag.to_ascii_lowercase(), factory);
        self
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<_> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Resolve the kind of a descriptor.
    pub fn resolve(&self, descriptor: &BundleDescriptor) -> Result<BundleKind> {
        let factory = self.factories.get(descriptor.type_tag()).ok_or_else(|| {
            BundleError::UnknownBundleType {
                bundle: descriptor.name().to_string(),
                tag: descriptor.type_tag().to_string(),
            }
        })?;
        factory(descriptor)
    }

    /// Resolve and construct a bundle, validating its members.
    pub fn create(&self, descriptor: BundleDescriptor, settings: &Settings) -> Result<Bundle> {
        let kind = self.resolve(&descriptor)?;
        Bundle::new(descriptor, kind, &settings.media_root)
    }

    /// Load the declaration file and construct every bundle.
    ///
    /// The first invalid declaration aborts the load.
    pub fn load(&self, settings: &Settings) -> Result<BundleTable> {
        let path = settings.declarations_path();
        let descriptors = read_declarations(&path)?;

        let mut table = BundleTable::new();
        for descriptor in descriptors {
            let bundle = self.create(descriptor, settings)?;
            debug!("load"; "{} -> {}", bundle.name(), bundle.output_name());
            table.insert(bundle);
        }
        Ok(table)
    }
}

fn script(_: &BundleDescriptor) -> Result<BundleKind> {
    Ok(BundleKind::Script)
}

fn stylesheet(descriptor: &BundleDescriptor) -> Result<BundleKind> {
    let media = descriptor.option_str("media").unwrap_or(DEFAULT_MEDIA);
    Ok(BundleKind::Stylesheet {
        media: media.to_string(),
    })
}

fn image(descriptor: &BundleDescriptor) -> Result<BundleKind> {
    if descriptor.files().len() > 1 {
        return Err(BundleError::InvalidBundleDefinition {
            bundle: descriptor.name().to_string(),
            reason: format!(
                "image bundles can only contain one file, found {}",
                descriptor.files().len()
            ),
        });
    }
    Ok(BundleKind::Image)
}

fn icon(_: &BundleDescriptor) -> Result<BundleKind> {
    Ok(BundleKind::Icon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_tags() {
        let registry = Registry::with_defaults();
        let tags = registry.tags();
        for tag in ["css", "ico", "img", "js", "png", "svg"] {
            assert!(tags.contains(&tag), "missing {tag}");
        }
    }

    #[test]
    fn test_resolve_variants() {
        let registry = Registry::with_defaults();

        let desc = BundleDescriptor::simple("app.js", &["a.js"]);
        assert_eq!(registry.resolve(&desc).unwrap(), BundleKind::Script);

        let desc = BundleDescriptor::simple("favicon.ico", &["favicon.ico"]);
        assert_eq!(registry.resolve(&desc).unwrap(), BundleKind::Icon);

        let mut options = BTreeMap::new();
        options.insert("media".to_string(), serde_yaml::Value::from("print"));
        let desc = BundleDescriptor::new("print.css", None, None, options);
        assert_eq!(
            registry.resolve(&desc).unwrap(),
            BundleKind::Stylesheet {
                media: "print".into()
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        let registry = Registry::with_defaults();
        let desc = BundleDescriptor::simple("notes.txt", &["notes.txt"]);
        assert!(matches!(
            registry.resolve(&desc),
            Err(BundleError::UnknownBundleType { tag, .. }) if tag == "txt"
        ));

        let empty = Registry::empty();
        let desc = BundleDescriptor::simple("app.js", &["a.js"]);
        assert!(empty.resolve(&desc).is_err());
    }

    #[test]
    fn test_custom_registration() {
        fn text(_: &BundleDescriptor) -> Result<BundleKind> {
            Ok(BundleKind::Script)
        }
        let mut registry = Registry::empty();
        registry.register("MJS", text);
        let desc = BundleDescriptor::simple("module.mjs", &["m.mjs"]);
        assert_eq!(registry.resolve(&desc).unwrap(), BundleKind::Script);
    }

    #[test]
    fn test_image_single_file_only() {
        let registry = Registry::with_defaults();
        let desc = BundleDescriptor::simple("sprite.png", &["a.png", "b.png"]);
        assert!(matches!(
            registry.resolve(&desc),
            Err(BundleError::InvalidBundleDefinition { .. })
        ));
    }

    #[test]
    fn test_load_table() {
        let fx = Fixture::new();
        fx.source("js/a.js", "var a;");
        fx.source("css/site.css", "body{}");
        fx.source("img/logo.png", "PNG");
        fx.declare(
            r"
app.js:
  files: [js/a.js]
site.css:
  files: [css/site.css]
  media: all
img/logo.png:
",
        );

        let table = Registry::with_defaults().load(&fx.settings()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.lookup("site.css").unwrap().kind(),
            &BundleKind::Stylesheet {
                media: "all".into()
            }
        );
        assert_eq!(table.lookup("img/logo.png").unwrap().kind(), &BundleKind::Image);
    }

    #[test]
    fn test_load_failures() {
        let fx = Fixture::new();
        let registry = Registry::with_defaults();

        // No declaration file at all.
        assert!(matches!(
            registry.load(&fx.settings()),
            Err(BundleError::Configuration(_))
        ));

        fx.declare("");
        assert!(matches!(
            registry.load(&fx.settings()),
            Err(BundleError::NoBundlesDeclared(_))
        ));

        fx.declare("app.js:\n  files: [js/nope.js]\n");
        assert!(matches!(
            registry.load(&fx.settings()),
            Err(BundleError::MissingSourceFile { .. })
        ));

        fx.source("a.png", "1");
        fx.source("b.png", "2");
        fx.declare("sprite.png:\n  files: [a.png, b.png]\n");
        assert!(matches!(
            registry.load(&fx.settings()),
            Err(BundleError::InvalidBundleDefinition { .. })
        ));
        assert!(!fx.media().join("bundles").exists());
    }
}
