//! Entry-name validation and collision-free stored-name derivation.

use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_entity::file::model::extension_of;

/// Content type recorded when the caller supplies none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Validate a folder or file name (a single path segment).
pub fn validate_entry_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if name.contains('/') {
        return Err(AppError::path_conflict(format!(
            "Name '{name}' cannot contain '/'"
        )));
    }
    Ok(())
}

/// Derive a collision-free physical name for a file:
/// `<base>_<random-suffix><ext>`.
///
/// The extension comes from `name`, falling back to the extension of
/// `previous_name` when `name` has none (a rename may omit it).
pub fn unique_stored_name(name: &str, previous_name: Option<&str>) -> String {
    let own_ext = extension_of(name);
    let ext = own_ext
        .or_else(|| previous_name.and_then(extension_of))
        .unwrap_or("");
    let stem = match own_ext {
        Some(e) => &name[..name.len() - e.len()],
        None => name,
    };
    format!("{stem}_{}{ext}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_entry_name() {
        assert!(validate_entry_name("report.pdf").is_ok());
        assert!(validate_entry_name("").is_err());
        assert!(validate_entry_name("   ").is_err());
        assert!(validate_entry_name("a/b").is_err());
    }

    #[test]
    fn test_stored_name_keeps_extension() {
        let stored = unique_stored_name("report.pdf", None);
        assert!(stored.starts_with("report_"));
        assert!(stored.ends_with(".pdf"));
        assert!(stored.len() > "report_.pdf".len());
    }

    #[test]
    fn test_stored_name_falls_back_to_previous_extension() {
        let stored = unique_stored_name("renamed", Some("old.tar.gz"));
        assert!(stored.starts_with("renamed_"));
        assert!(stored.ends_with(".gz"));
    }

    #[test]
    fn test_stored_name_without_any_extension() {
        let stored = unique_stored_name("README", None);
        assert!(stored.starts_with("README_"));
        assert!(!stored.contains('.'));
    }

    #[test]
    fn test_stored_names_are_unique() {
        assert_ne!(
            unique_stored_name("a.txt", None),
            unique_stored_name("a.txt", None)
        );
    }
}
