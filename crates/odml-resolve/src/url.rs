//! Minimal URL handling for document locations.
//!
//! Documents are addressed by plain paths, `file://` URLs, or remote URLs
//! that a [`DocumentReader`](crate::DocumentReader) knows how to fetch. Only
//! the operations resolution needs are implemented: splitting off a
//! fragment, normalizing cache keys, and resolving relative references.

/// Split `url#fragment` into its parts. An empty fragment counts as none.
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((base, fragment)) if !fragment.is_empty() => (base, Some(fragment)),
        Some((base, _)) => (base, None),
        None => (url, None),
    }
}

/// The scheme of `url`, if it has one.
///
/// A single letter before `:` is a drive letter, not a scheme.
pub fn scheme(url: &str) -> Option<&str> {
    let (candidate, _) = url.split_once(':')?;
    let valid = candidate.len() > 1
        && candidate.starts_with(|c: char| c.is_ascii_alphabetic())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

/// Canonical cache key for a document URL: trimmed, fragment removed,
/// scheme and host lowercased, trailing `/` removed.
///
/// ```
/// use odml_resolve::url::normalize_url;
///
/// assert_eq!(
///     normalize_url(" HTTP://Terms.Example.org/Lab/terms.xml#Cell "),
///     "http://terms.example.org/Lab/terms.xml"
/// );
/// ```
pub fn normalize_url(url: &str) -> String {
    let (base, _) = split_fragment(url.trim());
    let base = base.trim_end_matches('/');
    match base.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = match rest.find('/') {
                Some(i) => rest.split_at(i),
                None => (rest, ""),
            };
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                host.to_ascii_lowercase(),
                path
            )
        }
        None => base.to_string(),
    }
}

/// Resolve `reference` against the document location `base`.
///
/// References with a scheme or a leading `/` are returned unchanged, as are
/// all references when no base is known. Otherwise the reference replaces
/// the last path component of `base`, and `.`/`..` components are folded.
pub fn resolve_relative(base: Option<&str>, reference: &str) -> String {
    let Some(base) = base else {
        return reference.to_string();
    };
    if scheme(reference).is_some() || reference.starts_with('/') {
        return reference.to_string();
    }
    let (base, _) = split_fragment(base);
    let (reference, fragment) = split_fragment(reference);

    let (prefix, base_path) = match base.split_once("://") {
        Some((scheme, rest)) => match rest.find('/') {
            Some(i) => (format!("{scheme}://{}", &rest[..i]), &rest[i..]),
            None => (format!("{scheme}://{rest}"), "/"),
        },
        None => (String::new(), base),
    };
    let directory = match base_path.rfind('/') {
        Some(i) => &base_path[..=i],
        None => "",
    };

    let joined = format!("{directory}{reference}");
    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "." => {}
            ".." if parts.last().is_some_and(|p| !p.is_empty() && *p != "..") => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    let mut resolved = prefix + &parts.join("/");
    if let Some(fragment) = fragment {
        resolved.push('#');
        resolved.push_str(fragment);
    }
    resolved
}
