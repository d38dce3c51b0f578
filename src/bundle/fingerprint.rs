//! Content-addressed bundle names.
//!
//! The fingerprint is the URL-safe base64 (no padding) of the SHA-1 digest
//! over every member file's raw bytes in declared order. It depends only on
//! content, never on timestamps or locations.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha1::{Digest, Sha1};

/// Length of an encoded fingerprint (20-byte digest, unpadded base64).
pub const FINGERPRINT_LEN: usize = 27;

/// Fingerprint the concatenation of `files`.
pub fn fingerprint_files<P: AsRef<Path>>(files: &[P]) -> io::Result<String> {
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 64 * 1024];

    for path in files {
        let mut reader = BufReader::new(File::open(path)?);
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    Ok(encode(&hasher.finalize()))
}

/// Fingerprint an in-memory byte string.
pub fn fingerprint_bytes(data: &[u8]) -> String {
    encode(&Sha1::digest(data))
}

fn encode(digest: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(digest)
}

/// `base.hash.ext` for `base.ext`, `name.hash` when there is no extension.
///
/// Only a `.` inside the last path segment starts an extension, so
/// `js/jquery.ui/core` is treated as extension-less.
pub fn fingerprinted_name(name: &str, hash: &str) -> String {
    match split_extension(name) {
        Some((base, ext)) => format!("{base}.{hash}.{ext}"),
        None => format!("{name}.{hash}"),
    }
}

/// Split `name` at the extension dot of its last path segment.
pub fn split_extension(name: &str) -> Option<(&str, &str)> {
    let (base, ext) = name.rsplit_once('.')?;
    if ext.contains('/') || base.is_empty() || base.ends_with('/') {
        return None;
    }
    Some((base, ext))
}

/// Whether `segment` looks like an encoded fingerprint.
pub fn is_fingerprint(segment: &str) -> bool {
    segment.len() == FINGERPRINT_LEN
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_known_value() {
        // sha1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        assert_eq!(fingerprint_bytes(b"abc"), "qZk-NkcGgWq6PiVxeFDCbJzQ2J0");
        assert_eq!(fingerprint_bytes(b"abc").len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_fingerprint_is_concatenation() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        fs::write(&a, "var a;").unwrap();
        fs::write(&b, "var b;").unwrap();

        let hash = fingerprint_files(&[&a, &b]).unwrap();
        assert_eq!(hash, fingerprint_bytes(b"var a;var b;"));

        let reversed = fingerprint_files(&[&b, &a]).unwrap();
        assert_ne!(hash, reversed);
    }

    #[test]
    fn test_fingerprint_ignores_location() {
        let dir = TempDir::new().unwrap();
        let one = dir.path().join("one/x.css");
        let two = dir.path().join("two/y.css");
        fs::create_dir_all(one.parent().unwrap()).unwrap();
        fs::create_dir_all(two.parent().unwrap()).unwrap();
        fs::write(&one, "body{}").unwrap();
        fs::write(&two, "body{}").unwrap();

        assert_eq!(
            fingerprint_files(&[&one]).unwrap(),
            fingerprint_files(&[&two]).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_missing_file() {
        assert!(fingerprint_files(&[Path::new("/nonexistent/a.js")]).is_err());
    }

    #[test]
    fn test_fingerprinted_name() {
        assert_eq!(fingerprinted_name("app.js", "H"), "app.H.js");
        assert_eq!(fingerprinted_name("img/logo.png", "H"), "img/logo.H.png");
        assert_eq!(fingerprinted_name("vendor", "H"), "vendor.H");
        assert_eq!(fingerprinted_name("js/jquery.ui/core", "H"), "js/jquery.ui/core.H");
        assert_eq!(fingerprinted_name(".hidden", "H"), ".hidden.H");
    }

    #[test]
    fn test_is_fingerprint() {
        assert!(is_fingerprint(&fingerprint_bytes(b"x")));
        assert!(!is_fingerprint("min"));
        assert!(!is_fingerprint("qZk+NkcGgWq6PiVxeFDCbJzQ2J0"));
    }
}
