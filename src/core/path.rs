//! Path module for docquery
//!
//! A Path is a typed reference to a document field. Paths form a chain of
//! segments from a root variable (the queried entity) down to the field,
//! possibly through collection wildcards and transparent delegate wrappers.

use std::fmt;
use std::sync::Arc;

/// Kinds of path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Named property of the parent
    Property,
    /// Any element of the collection at the parent path
    CollectionAny,
    /// Transparent wrapper around its parent
    Delegate,
    /// Query root
    Variable,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct PathMetadata {
    element: String,
    parent: Option<Path>,
    kind: PathKind,
}

/// A path to a field (e.g. `user.address.city`)
///
/// Paths are immutable and cheap to clone; a child shares its parent chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Arc<PathMetadata>);

impl Path {
    fn with_parent(parent: Option<Path>, element: impl Into<String>, kind: PathKind) -> Self {
        Path(Arc::new(PathMetadata {
            element: element.into(),
            parent,
            kind,
        }))
    }

    /// Create a root variable path
    pub fn variable<S: Into<String>>(name: S) -> Self {
        Self::with_parent(None, name, PathKind::Variable)
    }

    /// Create a named property under this path
    pub fn property<S: Into<String>>(&self, name: S) -> Self {
        Self::with_parent(Some(self.clone()), name, PathKind::Property)
    }

    /// Create the "any element" segment of this collection path
    pub fn any(&self) -> Self {
        Self::with_parent(Some(self.clone()), "any", PathKind::CollectionAny)
    }

    /// Wrap this path in a transparent delegate
    pub fn delegate(&self) -> Self {
        Self::with_parent(Some(self.clone()), "", PathKind::Delegate)
    }

    /// Create a map-entry segment under this path
    pub fn key<S: Into<String>>(&self, key: S) -> Self {
        self.property(key)
    }

    /// Segment identifier
    pub fn element(&self) -> &str {
        &self.0.element
    }

    pub fn parent(&self) -> Option<&Path> {
        self.0.parent.as_ref()
    }

    pub fn kind(&self) -> PathKind {
        self.0.kind
    }

    /// Check if this is a root variable
    pub fn is_root(&self) -> bool {
        self.0.kind == PathKind::Variable
    }

    /// Get the root of the parent chain
    pub fn root(&self) -> &Path {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Number of segments between this path and its root
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }
}

/// Format a Path the way it was built, root included
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{}", parent)?;
            match self.kind() {
                PathKind::CollectionAny => return write!(f, ".any()"),
                PathKind::Delegate => return Ok(()),
                _ => {}
            }
            write!(f, ".")?;
        }
        write!(f, "{}", self.element())
    }
}
