//! Name and type validation for sections and properties.
//!
//! Names:
//! - Must be non-empty and not only whitespace
//! - Must not contain `/` (the path separator)
//! - Must not be `.` or `..` (reserved path segments)
//!
//! Section types are normalized (trimmed, lowercased, inner whitespace
//! replaced by `_`) and may be hierarchical: `stimulus/white_noise` is a
//! subtype of `stimulus`. Every `/`-separated component must be non-empty.

use crate::error::{TreeError, TreeResult};

/// Type given to the document root.
pub const ROOT_TYPE: &str = "document";

/// Validate a section or property name.
///
/// # Examples
///
/// ```
/// use odml_tree::names::validate_name;
///
/// assert!(validate_name("recording").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("a/b").is_err());
/// ```
pub fn validate_name(name: &str) -> TreeResult<()> {
    if name.trim().is_empty() {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".into(),
        });
    }
    if name.contains('/') {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain '/'".into(),
        });
    }
    if name == "." || name == ".." {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
            reason: "'.' and '..' are reserved path segments".into(),
        });
    }
    Ok(())
}

/// Normalize and validate a section type.
pub fn normalize_type(section_type: &str) -> TreeResult<String> {
    let normalized = section_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();

    if normalized.is_empty() {
        return Err(TreeError::InvalidType {
            section_type: section_type.to_string(),
            reason: "type must not be empty".into(),
        });
    }
    if normalized.split('/').any(str::is_empty) {
        return Err(TreeError::InvalidType {
            section_type: section_type.to_string(),
            reason: "type components between '/' must not be empty".into(),
        });
    }
    Ok(normalized)
}

/// Whether `candidate` equals `wanted` or is one of its subtypes.
pub fn type_matches(candidate: &str, wanted: &str) -> bool {
    candidate == wanted
        || candidate
            .strip_prefix(wanted)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Case-insensitive name comparison used by every lookup.
pub fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_bad_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(".").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("...").is_ok());
    }

    #[test]
    fn normalizes_types() {
        assert_eq!(normalize_type(" Recording ").unwrap(), "recording");
        assert_eq!(normalize_type("white  noise").unwrap(), "white_noise");
        assert_eq!(
            normalize_type("Stimulus/White_Noise").unwrap(),
            "stimulus/white_noise"
        );
    }

    #[test]
    fn rejects_bad_types() {
        assert!(normalize_type("").is_err());
        assert!(normalize_type("/stimulus").is_err());
        assert!(normalize_type("stimulus/").is_err());
        assert!(normalize_type("a//b").is_err());
    }

    #[test]
    fn subtype_matching() {
        assert!(type_matches("stimulus", "stimulus"));
        assert!(type_matches("stimulus/white_noise", "stimulus"));
        assert!(!type_matches("stimulus_extra", "stimulus"));
        assert!(!type_matches("stimulus", "stimulus/white_noise"));
    }

    #[test]
    fn names_compare_case_insensitively() {
        assert!(same_name("Gain", "gain"));
        assert!(!same_name("gain", "gains"));
        assert!(same_name("Ärger", "ärger"));
    }

    proptest! {
        #[test]
        fn slash_free_words_are_valid_names(name in "[A-Za-z0-9_ -]{0,8}[A-Za-z0-9_]") {
            prop_assert!(validate_name(&name).is_ok());
        }

        #[test]
        fn normalization_is_idempotent(t in "[A-Za-z]{1,6}( [A-Za-z]{1,6})?(/[A-Za-z]{1,6})?") {
            let once = normalize_type(&t).unwrap();
            prop_assert_eq!(normalize_type(&once).unwrap(), once);
        }
    }
}
