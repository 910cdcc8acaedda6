//! Roles: named grants of permissions to users.

use std::collections::BTreeMap;

use crate::document::{ConfigDocument, ConfigSection};
use crate::permission::PermissionSet;

/// Name of the role written by the setup wizard.
pub const ADMINISTRATORS_ROLE: &str = "Administrators";

/// A named set of permissions granted to a list of users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub users: Vec<String>,
    pub permissions: Vec<String>,
}

impl Role {
    /// The all-permissions role granted to the initial administrator.
    #[must_use]
    pub fn administrators(username: impl Into<String>) -> Self {
        Self {
            name: ADMINISTRATORS_ROLE.to_string(),
            users: vec![username.into()],
            permissions: vec!["*".to_string()],
        }
    }

    /// Parse a role from its section; comma-separated lists, blanks ignored.
    #[must_use]
    pub fn from_section(section: &ConfigSection) -> Self {
        Self {
            name: section.name().to_string(),
            users: split_list(section.get("users")),
            permissions: split_list(section.get("permissions")),
        }
    }

    #[must_use]
    pub fn to_section(&self) -> ConfigSection {
        let mut values = BTreeMap::new();
        values.insert("users".to_string(), self.users.join(", "));
        values.insert("permissions".to_string(), self.permissions.join(", "));
        ConfigSection::with_values(self.name.clone(), values)
    }

    /// Whether `username` is a member of this role.
    #[must_use]
    pub fn applies_to(&self, username: &str) -> bool {
        self.users.iter().any(|user| user == username || user == "*")
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse every role in `doc`.
#[must_use]
pub fn parse_all(doc: &ConfigDocument) -> Vec<Role> {
    doc.sections().map(Role::from_section).collect()
}

/// Union of the permissions of all roles in `doc` that apply to `username`.
#[must_use]
pub fn permissions_for(doc: &ConfigDocument, username: &str) -> PermissionSet {
    let mut permissions = PermissionSet::new();
    for role in parse_all(doc).into_iter().filter(|r| r.applies_to(username)) {
        permissions.extend(role.permissions);
    }
    permissions
}
