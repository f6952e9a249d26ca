//! Source fingerprints and compiler invocation signatures.

use std::fmt;
use std::path::Path;

use cairn_common::ContentHash;

use crate::error::CacheError;

/// Utility for computing content fingerprints of source files.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the fingerprint of a single file.
    ///
    /// Reads the file and returns its XXH3-128 content hash.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }
}

/// Digest of everything about a compiler invocation that affects output bytes.
///
/// Built from the program and its full argument list: source and output
/// paths, import roots, and every flag. Two invocations with the same
/// signature over the same source content produce the same artifacts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationSignature(ContentHash);

impl InvocationSignature {
    /// Computes the signature of `program` invoked with `args`.
    pub fn from_command<S: AsRef<str>>(program: &str, args: &[S]) -> Self {
        let parts = std::iter::once(program).chain(args.iter().map(AsRef::as_ref));
        Self(ContentHash::from_parts(parts))
    }

    /// Combines the signatures of a multi-stage pipeline into one.
    pub fn combine(stages: &[InvocationSignature]) -> Self {
        let parts: Vec<String> = stages.iter().map(|s| s.0.to_string()).collect();
        Self(ContentHash::from_parts(parts))
    }

    /// The underlying hash as persisted in the cache table.
    pub fn digest(&self) -> ContentHash {
        self.0
    }
}

impl fmt::Debug for InvocationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvocationSignature({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_file_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.cairo");
        std::fs::write(&path, "%lang starknet").unwrap();

        let h1 = SourceHasher::hash_file(&path).unwrap();
        let h2 = SourceHasher::hash_file(&path).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_file_different_content() {
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("a.cairo");
        let path_b = dir.path().join("b.cairo");
        std::fs::write(&path_a, "func a() {}").unwrap();
        std::fs::write(&path_b, "func b() {}").unwrap();

        let h1 = SourceHasher::hash_file(&path_a).unwrap();
        let h2 = SourceHasher::hash_file(&path_b).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn hash_file_nonexistent_errors() {
        let result = SourceHasher::hash_file(Path::new("/nonexistent/file.cairo"));
        assert!(matches!(result, Err(CacheError::Io { .. })));
    }

    #[test]
    fn signature_changes_with_any_flag() {
        let base = ["a.cairo", "--output", "a.json"];
        let with_flag = ["a.cairo", "--output", "a.json", "--account_contract"];
        let s1 = InvocationSignature::from_command("starknet-compile-deprecated", &base);
        let s2 = InvocationSignature::from_command("starknet-compile-deprecated", &with_flag);
        let s3 = InvocationSignature::from_command("other-compiler", &base);
        assert_ne!(s1, s2);
        assert_ne!(s1, s3);
        assert_eq!(
            s1,
            InvocationSignature::from_command("starknet-compile-deprecated", &base)
        );
    }

    #[test]
    fn combined_signature_depends_on_every_stage() {
        let a = InvocationSignature::from_command("starknet-compile", &["x"]);
        let b = InvocationSignature::from_command("starknet-sierra-compile", &["y"]);
        let c = InvocationSignature::from_command("starknet-sierra-compile", &["z"]);
        assert_ne!(
            InvocationSignature::combine(&[a, b]),
            InvocationSignature::combine(&[a, c])
        );
    }
}
