//! Data root resolution and lexical path containment.
//!
//! Collections are addressed by absolute-style identifiers (`/corpus/news`)
//! interpreted relative to the data root. Containment is decided on the
//! lexically normalised path without touching the filesystem, so symbolic
//! links inside the data root are not followed.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Absolute, normalised directory that confines collection paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRoot {
    path: PathBuf,
}

/// Errors raised while resolving the data root.
#[derive(Debug, Error)]
pub enum DataRootError {
    /// The configured directory was empty.
    #[error("data directory must not be empty")]
    Empty,
    /// A relative directory could not be made absolute.
    #[error("failed to resolve data directory '{path}': {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DataRoot {
    /// Resolves `path` against the current directory and normalises it.
    ///
    /// # Errors
    ///
    /// Returns [`DataRootError::Empty`] for an empty path and
    /// [`DataRootError::Resolve`] when the working directory is unavailable.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataRootError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(DataRootError::Empty);
        }
        let absolute = std::path::absolute(path).map_err(|source| DataRootError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: normalise_lexically(&absolute),
        })
    }

    /// The normalised root path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        self.path.as_path()
    }

    /// Joins `relative` onto the root and normalises the result.
    ///
    /// An absolute `relative` replaces the root entirely, which callers then
    /// reject through [`DataRoot::contains`].
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        normalise_lexically(&self.path.join(relative))
    }

    /// Whether `candidate` is the root itself or one of its descendants.
    #[must_use]
    pub fn contains(&self, candidate: &Path) -> bool {
        candidate.starts_with(&self.path)
    }
}

/// Removes `.` segments and folds `..` into the preceding segment.
///
/// Parent segments at the filesystem root are dropped, matching how
/// operating systems treat `/..`.
#[must_use]
pub fn normalise_lexically(path: &Path) -> PathBuf {
    let mut normalised = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalised.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalised.pop() && !path.has_root() {
                    normalised.push(component.as_os_str());
                }
            }
            Component::Normal(segment) => normalised.push(segment),
        }
    }
    normalised
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn root() -> DataRoot {
        DataRoot::new("/srv/annotd/data").expect("absolute root")
    }

    #[rstest]
    #[case::plain("/srv/a/b", "/srv/a/b")]
    #[case::current("/srv/./a/./b", "/srv/a/b")]
    #[case::parent("/srv/a/../b", "/srv/b")]
    #[case::above_root("/../../etc", "/etc")]
    #[case::trailing_parent("/srv/a/b/..", "/srv/a")]
    fn normalises_absolute_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise_lexically(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case::root("")]
    #[case::collection("news/")]
    #[case::nested("news/2011/../2012")]
    fn keeps_descendants_inside(root: DataRoot, #[case] relative: &str) {
        let resolved = root.resolve(relative);
        assert!(root.contains(&resolved), "{resolved:?} should be inside");
    }

    #[rstest]
    #[case::escape("../../etc")]
    #[case::sibling("../data-other")]
    #[case::absolute("/etc/passwd")]
    fn rejects_escaping_paths(root: DataRoot, #[case] relative: &str) {
        let resolved = root.resolve(relative);
        assert!(!root.contains(&resolved), "{resolved:?} should be outside");
    }

    #[test]
    fn sibling_with_shared_prefix_is_outside() {
        let root = DataRoot::new("/srv/data").expect("root");
        assert!(!root.contains(Path::new("/srv/database")));
    }

    #[test]
    fn rejects_empty_root() {
        assert!(matches!(DataRoot::new(""), Err(DataRootError::Empty)));
    }
}
