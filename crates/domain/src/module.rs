//! Module: an installable extension of the dashboard.

use std::path::PathBuf;

use crate::error::ValidationError;

/// An installed module as reported by the module manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub enabled: bool,
    pub path: PathBuf,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Check that `name` only contains `[A-Za-z0-9_-]`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidModuleName`] otherwise, including for
/// the empty string.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidModuleName(name.to_string()))
    }
}

/// Order modules for listing: enabled first, then by name.
pub fn sort_for_listing(modules: &mut [Module]) {
    modules.sort_by(|a, b| b.enabled.cmp(&a.enabled).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, enabled: bool) -> Module {
        Module {
            name: name.to_string(),
            enabled,
            path: PathBuf::from("/usr/share/modules").join(name),
            version: None,
            description: None,
        }
    }

    #[test]
    fn should_list_enabled_modules_first() {
        let mut modules = vec![
            module("setup", false),
            module("monitoring", true),
            module("doc", true),
            module("audit", false),
        ];
        sort_for_listing(&mut modules);
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["doc", "monitoring", "audit", "setup"]);
    }

    #[test]
    fn should_reject_path_traversal_in_name() {
        assert!(validate_name("../etc").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("monitoring_2-x").is_ok());
    }
}
