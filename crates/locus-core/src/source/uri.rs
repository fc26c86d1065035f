//! Relative-reference combination.
//!
//! Hierarchical bases (`file:///a/b/x.src`) follow RFC 3986 via [`Url::join`].
//! Opaque bases such as `package:a/b.dart` or `dart:core` cannot act as a base for
//! the `url` crate, so their paths are merged here with the same rules.

use url::Url;

use crate::error::{SourceError, SourceResult};

/// Combine `reference` with `base`, producing an absolute URI.
///
/// A reference that carries its own scheme replaces the base entirely.
pub fn resolve_reference(base: &Url, reference: &str) -> SourceResult<Url> {
    match Url::parse(reference) {
        Ok(absolute) => return Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(source) => return Err(malformed(base, reference, source)),
    }

    if base.cannot_be_a_base() {
        join_opaque(base, reference)
    } else {
        base.join(reference)
            .map_err(|source| malformed(base, reference, source))
    }
}

fn join_opaque(base: &Url, reference: &str) -> SourceResult<Url> {
    let split = reference.find(['?', '#']).unwrap_or(reference.len());
    let (ref_path, suffix) = reference.split_at(split);
    let base_path = base.path();

    let merged = if ref_path.is_empty() {
        base_path.to_string()
    } else if let Some(rooted) = ref_path.strip_prefix('/') {
        rooted.to_string()
    } else {
        match base_path.rfind('/') {
            Some(idx) => format!("{}{}", &base_path[..=idx], ref_path),
            // `dart:core` + `x.dart` names a file inside the library
            None => format!("{}/{}", base_path, ref_path),
        }
    };

    let text = format!("{}:{}{}", base.scheme(), remove_dot_segments(&merged), suffix);
    Url::parse(&text).map_err(|source| malformed(base, reference, source))
}

/// Remove `.` and `..` segments from a relative path. `..` never climbs above the root.
fn remove_dot_segments(path: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let mut trailing_slash = false;

    for segment in path.split('/') {
        trailing_slash = false;
        match segment {
            "." => trailing_slash = true,
            ".." => {
                output.pop();
                trailing_slash = true;
            }
            "" => {}
            other => output.push(other),
        }
    }

    let mut joined = output.join("/");
    if (trailing_slash || path.ends_with('/')) && !joined.is_empty() {
        joined.push('/');
    }
    joined
}

fn malformed(base: &Url, reference: &str, source: url::ParseError) -> SourceError {
    SourceError::MalformedReference {
        base: base.clone(),
        reference: reference.to_string(),
        source,
    }
}
