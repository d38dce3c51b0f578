//! Behavioral variants of a bundle.

/// A pair of literal delimiters surrounding a cross-bundle reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub open: &'static str,
    pub close: &'static str,
}

impl Delimiter {
    const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }
}

const SCRIPT_DELIMITERS: &[Delimiter] = &[Delimiter::new("'", "'"), Delimiter::new("\"", "\"")];

const STYLESHEET_DELIMITERS: &[Delimiter] = &[
    Delimiter::new("url(", ")"),
    Delimiter::new("url('", "')"),
    Delimiter::new("url(\"", "\")"),
];

/// Blank line appended after every member of text bundles.
const TEXT_SEPARATOR: &[u8] = b"\n\n";

/// Default `media` attribute of stylesheet includes.
pub const DEFAULT_MEDIA: &str = "screen";

/// Kind of bundle, resolved from its type tag by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleKind {
    /// JavaScript, concatenated and minified.
    Script,
    /// CSS, concatenated and minified.
    Stylesheet { media: String },
    /// Single image file.
    Image,
    /// Single favicon.
    Icon,
}

impl BundleKind {
    /// Tag the compression and lint capabilities are keyed by.
    pub const fn file_type(&self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Stylesheet { .. } => "css",
            Self::Image => "img",
            Self::Icon => "ico",
        }
    }

    /// Bytes written after each member file.
    pub const fn separator(&self) -> &'static [u8] {
        match self {
            Self::Script | Self::Stylesheet { .. } => TEXT_SEPARATOR,
            Self::Image | Self::Icon => b"",
        }
    }

    /// Delimiters that mark references to other bundles.
    pub const fn delimiters(&self) -> &'static [Delimiter] {
        match self {
            Self::Script => SCRIPT_DELIMITERS,
            Self::Stylesheet { .. } => STYLESHEET_DELIMITERS,
            Self::Image | Self::Icon => &[],
        }
    }

    /// Markup including one file at `url`.
    pub fn include_file(&self, url: &str) -> String {
        match self {
            Self::Script => format!(r#"<script type="text/javascript" src="{url}"></script>"#),
            Self::Stylesheet { media } => format!(
                r#"<link href="{url}" media="{media}" rel="stylesheet" type="text/css" />"#
            ),
            Self::Image => format!(r#"<img alt="" src="{url}" />"#),
            Self::Icon => format!(r#"<link rel="icon shortcut" href="{url}" type="image/x-icon" />"#),
        }
    }
}
