//! Reference arithmetic on module identities.
//!
//! Identities are either absolute URLs (`file:///...`, `classpath:/...`) or
//! logical paths inside an archive (`.atomist/editors/Foo.ts`). Relative
//! references are resolved the same way for both: URL joining for absolute
//! bases, path merging plus dot-segment removal for logical ones.

use url::Url;

use crate::error::{LoaderError, LoaderResult};

/// Whether a specifier is relative to the file that mentions it.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Cheap syntactic check for `scheme:/...` (lowercase scheme).
///
/// Windows-style paths such as `C:/x` do not match because the scheme must be
/// lowercase, but `c:/x` does and is rejected later when it fails to open.
pub fn looks_like_url(specifier: &str) -> bool {
    match specifier.find(':') {
        Some(colon) if colon > 0 => {
            specifier[..colon].bytes().all(|b| b.is_ascii_lowercase())
                && specifier[colon + 1..].starts_with('/')
        }
        _ => false,
    }
}

/// The scheme of `uri`, if it has one.
fn scheme(uri: &str) -> Option<&str> {
    let colon = uri.find(':')?;
    let candidate = &uri[..colon];
    let mut bytes = candidate.bytes();
    let first = bytes.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')) {
        Some(candidate)
    } else {
        None
    }
}

/// Whether `uri` carries a scheme and can be fetched as a URL.
pub fn is_absolute(uri: &str) -> bool {
    scheme(uri).is_some()
}

/// Resolve `reference` against the identity `base`.
pub fn resolve_reference(base: &str, reference: &str) -> LoaderResult<String> {
    if is_absolute(reference) {
        return Ok(reference.to_string());
    }

    if is_absolute(base) {
        let base_url = Url::parse(base).map_err(|e| LoaderError::malformed(base, e))?;
        // `classpath:lib/a.js` has no hierarchy to resolve against.
        if base_url.cannot_be_a_base() {
            return Ok(reference.to_string());
        }
        let joined = base_url
            .join(reference)
            .map_err(|e| LoaderError::malformed(reference, e))?;
        return Ok(joined.into());
    }

    if reference.starts_with('/') {
        return Ok(normalize_path(reference));
    }

    let merged = match base.rfind('/') {
        Some(ix) => format!("{}{}", &base[..=ix], reference),
        None => reference.to_string(),
    };
    Ok(normalize_path(&merged))
}

/// Remove `.` and `..` segments from a logical path.
///
/// `..` segments that would climb above the start of a relative path are
/// kept, so `a/../../x` normalizes to `../x`.
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let segments: Vec<&str> = path.split('/').collect();
    let trailing_slash = matches!(segments.last(), Some(&"") | Some(&".") | Some(&".."));

    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ if absolute => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }

    let mut result = out.join("/");
    if absolute {
        result.insert(0, '/');
    }
    if trailing_slash && !out.is_empty() {
        result.push('/');
    }
    result
}
