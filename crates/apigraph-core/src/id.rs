//! The slash-delimited id scheme.
//!
//! Every entity id is the ids/names of the open stack frames joined with `/`,
//! followed by the entity's own name. Module ids are the exception: a module's
//! id is its package-relative file path without the extension, so
//! `pkg/sub/__init__.py` becomes `pkg/sub/__init__`.

/// Id separator.
pub const SEPARATOR: char = '/';

/// Id of an entity named `name` declared directly under `parent_id`.
pub fn child_id(parent_id: &str, name: &str) -> String {
    let mut id = String::with_capacity(parent_id.len() + name.len() + 1);
    id.push_str(parent_id);
    id.push(SEPARATOR);
    id.push_str(name);
    id
}

/// Id of an entity named `name` below a stack of open frames.
///
/// The first frame is the module id; later frames are declaration names.
pub fn stack_id<S: AsRef<str>>(frames: &[S], name: &str) -> String {
    let mut id = String::new();
    for frame in frames {
        id.push_str(frame.as_ref());
        id.push(SEPARATOR);
    }
    id.push_str(name);
    id
}

/// Module id from a package-relative path (`pkg/mod.py` -> `pkg/mod`).
///
/// Backslashes are normalized and `.py`/`.pyi` extensions stripped.
pub fn module_id_from_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./");
    let stem = trimmed
        .strip_suffix(".pyi")
        .or_else(|| trimmed.strip_suffix(".py"))
        .unwrap_or(trimmed);
    stem.to_string()
}

/// True if `child` is a proper extension of `owner` (`owner/...`).
pub fn is_owned_by(child: &str, owner: &str) -> bool {
    child.len() > owner.len() + 1
        && child.starts_with(owner)
        && child[owner.len()..].starts_with(SEPARATOR)
}

/// The id one level up, if any.
pub fn parent_id(id: &str) -> Option<&str> {
    id.rfind(SEPARATOR).map(|idx| &id[..idx])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_id_joins_frames() {
        let frames = ["pkg/mod", "Outer", "Inner"];
        assert_eq!(stack_id(&frames, "method"), "pkg/mod/Outer/Inner/method");
    }

    #[test]
    fn module_id_keeps_aggregator_stem() {
        assert_eq!(module_id_from_path("pkg/sub/__init__.py"), "pkg/sub/__init__");
        assert_eq!(module_id_from_path("pkg/_impl.pyi"), "pkg/_impl");
        assert_eq!(module_id_from_path("pkg\\win.py"), "pkg/win");
    }

    #[test]
    fn ownership_requires_separator() {
        assert!(is_owned_by("pkg/mod/f/x", "pkg/mod/f"));
        assert!(!is_owned_by("pkg/mod/fx", "pkg/mod/f"));
        assert!(!is_owned_by("pkg/mod/f", "pkg/mod/f"));
    }

    #[test]
    fn parent_id_strips_last_segment() {
        assert_eq!(parent_id("pkg/mod/C/m"), Some("pkg/mod/C"));
        assert_eq!(parent_id("pkg"), None);
    }
}
