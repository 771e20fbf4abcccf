//! Path validation
//!
//! Selector sanitization and the mapping from selectors to paths under the
//! document root. Every client supplied selector goes through [`sanitize`]
//! and then [`resolve`] before the filesystem is touched.

use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

/// Separator used inside selectors, independent of the host platform.
pub const SELECTOR_SEPARATOR: char = '/';

/// Truncates `selector` at the first `..` and normalizes path separators.
///
/// Returns `true` if the selector was altered. The request is not rejected;
/// truncation is the only mitigation applied.
pub fn sanitize(selector: &mut String) -> bool {
    let mut altered = false;

    if let Some(pos) = selector.find("..") {
        selector.truncate(pos);
        altered = true;
    }

    if MAIN_SEPARATOR != SELECTOR_SEPARATOR && selector.contains(SELECTOR_SEPARATOR) {
        *selector = selector.replace(SELECTOR_SEPARATOR, &MAIN_SEPARATOR.to_string());
        altered = true;
    }

    altered
}

/// Resolves a selector to a filesystem path inside `document_root`.
///
/// A leading `/` does not make the selector a host path; it is always taken
/// relative to the document root. Only plain name components are kept, so
/// the result never lies outside the root.
pub fn resolve(document_root: &Path, selector: &str) -> PathBuf {
    let segments: Vec<&str> = Path::new(selector)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    join_segments(document_root, &segments)
}

/// Appends each segment to `base`, returning an owned path.
pub fn join_segments(base: &Path, segments: &[&str]) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}

/// Builds a client-visible selector from a base and a relative selector.
///
/// Absolute references (leading `/`) are returned verbatim; otherwise the two
/// are joined with exactly one separator.
pub fn join(base_selector: &str, relative_selector: &str) -> String {
    if relative_selector.starts_with(SELECTOR_SEPARATOR) || base_selector.is_empty() {
        return relative_selector.to_string();
    }

    if base_selector.ends_with(SELECTOR_SEPARATOR) {
        format!("{}{}", base_selector, relative_selector)
    } else {
        format!("{}{}{}", base_selector, SELECTOR_SEPARATOR, relative_selector)
    }
}
