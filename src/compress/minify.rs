//! In-process minification for JS and CSS bundles.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{CompressOutcome, Compressor};
use crate::utils::fs::write_atomic;

/// Minify JavaScript source code.
///
/// Bundles are classic scripts concatenated together: parsed as scripts,
/// with top-level names left alone.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs().with_module(false);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// Built-in compressor for `js` and `css` bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minifier;

impl Minifier {
    /// Whether `file_type` has an in-process minifier.
    pub fn handles(file_type: &str) -> bool {
        matches!(file_type, "js" | "css")
    }
}

impl Compressor for Minifier {
    fn compress(&self, artifact: &Path, file_type: &str) -> Result<CompressOutcome> {
        if !Self::handles(file_type) {
            return Ok(CompressOutcome::Skipped);
        }

        let source = fs::read_to_string(artifact)
            .with_context(|| format!("Failed to read {}", artifact.display()))?;
        let minified = match file_type {
            "js" => minify_js(&source),
            _ => minify_css(&source),
        };
        let Some(minified) = minified else {
            return Ok(CompressOutcome::Failed(format!(
                "{file_type} parse error, left uncompressed"
            )));
        };

        write_atomic(artifact, minified.as_bytes())
            .with_context(|| format!("Failed to write {}", artifact.display()))?;
        Ok(CompressOutcome::Compressed {
            before: source.len() as u64,
            after: minified.len() as u64,
        })
    }

    fn name(&self) -> &str {
        "minify"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minify_js() {
        let out = minify_js("var answer = 40 + 2;\n\n// note\nconsole.log( answer );\n\n").unwrap();
        assert!(out.len() < 50);
        assert!(!out.contains("note"));
        assert!(minify_js("var = ;").is_none());
    }

    #[test]
    fn test_minify_css() {
        let out = minify_css("body {\n  color: #ff0000;\n}\n\n").unwrap();
        assert_eq!(out, "body{color:red}");
    }

    #[test]
    fn test_compress_artifact_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.abc.css");
        fs::write(&path, "a {\n  color: #ff0000;\n}\n\n").unwrap();

        let outcome = Minifier.compress(&path, "css").unwrap();
        assert!(matches!(outcome, CompressOutcome::Compressed { before, after } if after < before));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a{color:red}");
    }

    #[test]
    fn test_unhandled_and_broken() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("logo.png");
        fs::write(&png, [0u8, 1, 2]).unwrap();
        assert_eq!(Minifier.compress(&png, "img").unwrap(), CompressOutcome::Skipped);

        let js = dir.path().join("app.js");
        fs::write(&js, "function (").unwrap();
        assert!(matches!(
            Minifier.compress(&js, "js").unwrap(),
            CompressOutcome::Failed(_)
        ));
        assert_eq!(fs::read_to_string(&js).unwrap(), "function (");
    }
}
