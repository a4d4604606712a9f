//! Path resolution
//!
//! Turns a path node into the dot-delimited field name the store
//! understands. The root variable never appears in the output, delegate
//! segments are transparent, and "any element" segments collapse onto
//! their collection since the store matches array elements implicitly.

use crate::core::path::{Path, PathKind};

/// Resolve a path into its wire field name
pub fn resolve(path: &Path) -> String {
    if let Some(parent) = path.parent() {
        let parent = skip_delegates(parent);

        if path.kind() == PathKind::CollectionAny {
            return resolve(parent);
        }

        if parent.kind() != PathKind::Variable {
            let key = key_for_path(path);
            let parent_key = resolve(parent);
            return if key.is_empty() {
                parent_key
            } else {
                format!("{}.{}", parent_key, key)
            };
        }
    }
    key_for_path(path).to_string()
}

/// Nearest ancestor that is not a delegate
fn skip_delegates(mut parent: &Path) -> &Path {
    while parent.kind() == PathKind::Delegate {
        match parent.parent() {
            Some(next) => parent = next,
            None => break,
        }
    }
    parent
}

fn key_for_path(path: &Path) -> &str {
    path.element()
}
