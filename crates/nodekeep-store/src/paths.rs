use std::path::{Path, PathBuf};

use tracing::warn;

use crate::StoreError;

/// Maps `(node_id, filename)` to an absolute location under the storage
/// root. This is the trust boundary for all filesystem access: no other
/// module concatenates paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Build a resolver over an existing root directory. The root is
    /// canonicalized so the descendant check below compares resolved paths,
    /// not raw strings.
    pub fn new(root: &Path) -> Result<Self, StoreError> {
        let root = root
            .canonicalize()
            .map_err(|e| StoreError::Write(format!("canonicalize {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding one node's attachments.
    pub fn node_dir(&self, node_id: &str) -> Result<PathBuf, StoreError> {
        validate_segment(node_id, "node id")?;
        Ok(self.root.join(node_id))
    }

    /// Resolve an attachment path, rejecting anything that would escape
    /// the storage root.
    pub fn resolve(&self, node_id: &str, filename: &str) -> Result<PathBuf, StoreError> {
        validate_segment(node_id, "node id")?;
        validate_segment(filename, "filename")?;

        let resolved = self.root.join(node_id).join(filename);
        if !resolved.starts_with(&self.root) {
            warn!(node_id, filename, "path escapes storage root");
            return Err(StoreError::InvalidPath(format!(
                "{node_id}/{filename} escapes storage root"
            )));
        }
        Ok(resolved)
    }
}

/// A segment must be a single normal path component: non-empty, not `.` or
/// `..`, no separators, no NUL bytes.
fn validate_segment(segment: &str, what: &str) -> Result<(), StoreError> {
    let reject = |reason: &str| {
        warn!(segment, what, reason, "rejected path segment");
        Err(StoreError::InvalidPath(format!("{what} {segment:?}: {reason}")))
    };

    if segment.is_empty() {
        return reject("empty");
    }
    if segment == "." || segment == ".." {
        return reject("relative component");
    }
    if segment.contains('/') || segment.contains('\\') {
        return reject("contains separator");
    }
    if segment.contains('\0') {
        return reject("contains NUL");
    }

    // Belt and braces: the string checks above should guarantee this.
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Ok(()),
        _ => reject("not a single normal component"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> (tempfile::TempDir, PathResolver) {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(tmp.path()).unwrap();
        (tmp, resolver)
    }

    #[test]
    fn resolves_under_root() {
        let (tmp, resolver) = resolver();
        let path = resolver.resolve("node-1", "report.pdf").unwrap();
        assert!(path.starts_with(tmp.path().canonicalize().unwrap()));
        assert!(path.ends_with("node-1/report.pdf"));
    }

    #[test]
    fn rejects_traversal_filenames() {
        let (_tmp, resolver) = resolver();
        for bad in [
            "..",
            ".",
            "",
            "../secret",
            "../../etc/passwd",
            "a/b",
            "a\\b",
            "/etc/passwd",
            "name\0.txt",
        ] {
            let err = resolver.resolve("node-1", bad).unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidPath(_)),
                "expected InvalidPath for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_traversal_node_ids() {
        let (_tmp, resolver) = resolver();
        for bad in ["..", "", "a/b", "..\\..", "nodes/1"] {
            let err = resolver.resolve(bad, "file.txt").unwrap_err();
            assert!(matches!(err, StoreError::InvalidPath(_)), "node id {bad:?}");
            let err = resolver.node_dir(bad).unwrap_err();
            assert!(matches!(err, StoreError::InvalidPath(_)), "node id {bad:?}");
        }
    }

    #[test]
    fn accepts_dotfiles_and_unicode() {
        let (_tmp, resolver) = resolver();
        assert!(resolver.resolve("n", ".gitignore").is_ok());
        assert!(resolver.resolve("n", "résumé.pdf").is_ok());
        assert!(resolver.resolve("n", "...").is_ok());
    }

    #[test]
    fn root_is_canonicalized() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/../a");
        std::fs::create_dir_all(tmp.path().join("a")).unwrap();
        let resolver = PathResolver::new(&nested).unwrap();
        assert_eq!(resolver.root(), tmp.path().canonicalize().unwrap().join("a"));
    }

    #[test]
    fn missing_root_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("missing");
        assert!(PathResolver::new(&gone).is_err());
    }
}
