//! Dependency manifests for build tools
//!
//! One line per file read during compilation, in load order and without
//! duplicates: the SHA-256 of the file's contents, two spaces, the path. The
//! format matches `sha256sum`, so a manifest can be checked with
//! `sha256sum -c`.
//!
//! Digests are taken by the loader from the text it compiled; building a
//! manifest never reads the files again.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::types::FxIndexSet;

/// Lower-case hex SHA-256 of `text`.
pub fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Format `files` with their `digests` (same length, same order). The first
/// occurrence of a path wins.
pub fn dependency_manifest(files: &[PathBuf], digests: &[String]) -> String {
    debug_assert_eq!(files.len(), digests.len());
    let mut seen = FxIndexSet::default();
    let mut manifest = String::new();
    for (path, digest) in files.iter().zip(digests) {
        if seen.insert(path) {
            manifest.push_str(&format!("{digest}  {}\n", path.display()));
        }
    }
    manifest
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_lines_in_first_seen_order() {
        let files = [
            PathBuf::from("/v/b.html"),
            PathBuf::from("/v/a.html"),
            PathBuf::from("/v/b.html"),
        ];
        let digests = [sha256_hex("abc"), sha256_hex(""), sha256_hex("changed")];

        assert_eq!(
            dependency_manifest(&files, &digests),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  /v/b.html\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  /v/a.html\n"
        );
    }

    #[test]
    fn test_empty_manifest() {
        assert_eq!(dependency_manifest(&[], &[]), "");
    }
}
