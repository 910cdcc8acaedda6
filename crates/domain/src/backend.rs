//! Authentication backend: how user identities are verified.

use std::collections::BTreeMap;

use crate::document::{ConfigDocument, ConfigSection};
use crate::error::ValidationError;

/// Default object class of LDAP user entries.
pub const DEFAULT_LDAP_USER_CLASS: &str = "inetOrgPerson";
/// Default attribute holding an LDAP user's login name.
pub const DEFAULT_LDAP_USER_NAME_ATTRIBUTE: &str = "uid";

/// The kind-specific part of an [`AuthBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// Users are authenticated by the web server; their name is trusted.
    External {
        /// Pattern whose matches are removed from the remote user name.
        strip_username_regexp: Option<String>,
    },
    /// Users live in an LDAP directory.
    Ldap {
        resource: String,
        user_class: String,
        user_name_attribute: String,
        base_dn: Option<String>,
    },
    /// Users live in a SQL database.
    Db { resource: String },
}

impl BackendKind {
    /// Value of the `backend` key.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::External { .. } => "external",
            Self::Ldap { .. } => "ldap",
            Self::Db { .. } => "db",
        }
    }

    /// Human-readable name used in form descriptions.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::External { .. } => "external",
            Self::Ldap { .. } => "LDAP",
            Self::Db { .. } => "database",
        }
    }
}

/// A named authentication backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthBackend {
    pub name: String,
    pub kind: BackendKind,
}

impl AuthBackend {
    /// Parse a backend from its configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingKey`] when a mandatory key is absent
    /// and [`ValidationError::InvalidValue`] for an unknown `backend`.
    pub fn from_section(section: &ConfigSection) -> Result<Self, ValidationError> {
        let required = |key: &'static str| {
            section
                .get_non_empty(key)
                .map(str::to_string)
                .ok_or_else(|| ValidationError::MissingKey {
                    section: section.name().to_string(),
                    key,
                })
        };

        let kind = match required("backend")?.as_str() {
            "db" => BackendKind::Db {
                resource: required("resource")?,
            },
            "ldap" => BackendKind::Ldap {
                resource: required("resource")?,
                user_class: section
                    .get_non_empty("user_class")
                    .unwrap_or(DEFAULT_LDAP_USER_CLASS)
                    .to_string(),
                user_name_attribute: section
                    .get_non_empty("user_name_attribute")
                    .unwrap_or(DEFAULT_LDAP_USER_NAME_ATTRIBUTE)
                    .to_string(),
                base_dn: section.get_non_empty("base_dn").map(str::to_string),
            },
            "external" => BackendKind::External {
                strip_username_regexp: section
                    .get_non_empty("strip_username_regexp")
                    .map(str::to_string),
            },
            other => {
                return Err(ValidationError::InvalidValue {
                    key: "backend",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            name: section.name().to_string(),
            kind,
        })
    }

    /// Serialize into a configuration section.
    #[must_use]
    pub fn to_section(&self) -> ConfigSection {
        let mut values = BTreeMap::new();
        values.insert("backend".to_string(), self.kind.type_name().to_string());
        match &self.kind {
            BackendKind::External {
                strip_username_regexp,
            } => {
                if let Some(pattern) = strip_username_regexp {
                    values.insert("strip_username_regexp".to_string(), pattern.clone());
                }
            }
            BackendKind::Ldap {
                resource,
                user_class,
                user_name_attribute,
                base_dn,
            } => {
                values.insert("resource".to_string(), resource.clone());
                values.insert("user_class".to_string(), user_class.clone());
                values.insert(
                    "user_name_attribute".to_string(),
                    user_name_attribute.clone(),
                );
                if let Some(base_dn) = base_dn {
                    values.insert("base_dn".to_string(), base_dn.clone());
                }
            }
            BackendKind::Db { resource } => {
                values.insert("resource".to_string(), resource.clone());
            }
        }
        ConfigSection::with_values(self.name.clone(), values)
    }

    /// The resource this backend reads users from, if any.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        match &self.kind {
            BackendKind::External { .. } => None,
            BackendKind::Ldap { resource, .. } | BackendKind::Db { resource } => Some(resource),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Names of the backends in `doc` whose `resource` key equals `resource`,
/// in chain order. Each referencing backend is listed once.
#[must_use]
pub fn backends_using_resource<'a>(doc: &'a ConfigDocument, resource: &str) -> Vec<&'a str> {
    doc.sections()
        .filter(|section| section.get("resource") == Some(resource))
        .map(ConfigSection::name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, pairs: &[(&str, &str)]) -> ConfigSection {
        let mut section = ConfigSection::new(name);
        for (k, v) in pairs {
            section.set(*k, *v);
        }
        section
    }

    #[test]
    fn should_parse_db_backend() {
        let backend =
            AuthBackend::from_section(&section("web", &[("backend", "db"), ("resource", "db1")]))
                .unwrap();
        assert_eq!(
            backend.kind,
            BackendKind::Db {
                resource: "db1".to_string()
            }
        );
        assert_eq!(backend.resource(), Some("db1"));
    }

    #[test]
    fn should_default_ldap_attributes() {
        let backend = AuthBackend::from_section(&section(
            "dir",
            &[("backend", "ldap"), ("resource", "ldap1")],
        ))
        .unwrap();
        let BackendKind::Ldap {
            user_class,
            user_name_attribute,
            base_dn,
            ..
        } = backend.kind
        else {
            panic!("expected ldap backend");
        };
        assert_eq!(user_class, DEFAULT_LDAP_USER_CLASS);
        assert_eq!(user_name_attribute, DEFAULT_LDAP_USER_NAME_ATTRIBUTE);
        assert_eq!(base_dn, None);
    }

    #[test]
    fn should_parse_external_backend_without_resource() {
        let backend = AuthBackend::from_section(&section(
            "autologin",
            &[("backend", "external"), ("strip_username_regexp", "/@.*$/")],
        ))
        .unwrap();
        assert_eq!(backend.resource(), None);
        assert_eq!(backend.type_name(), "external");
    }

    #[test]
    fn should_reject_db_backend_without_resource() {
        let result = AuthBackend::from_section(&section("web", &[("backend", "db")]));
        assert!(matches!(
            result,
            Err(ValidationError::MissingKey {
                key: "resource",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_unknown_backend_kind() {
        let result = AuthBackend::from_section(&section("web", &[("backend", "kerberos")]));
        assert!(matches!(
            result,
            Err(ValidationError::InvalidValue { key: "backend", .. })
        ));
    }

    #[test]
    fn should_keep_resource_reference_when_written() {
        let backend = AuthBackend {
            name: "web".to_string(),
            kind: BackendKind::Db {
                resource: "db1".to_string(),
            },
        };
        let section = backend.to_section();
        assert_eq!(section.get("backend"), Some("db"));
        assert_eq!(section.get("resource"), Some("db1"));
    }

    #[test]
    fn should_list_every_backend_referencing_a_resource() {
        let doc: ConfigDocument = [
            section("a", &[("backend", "db"), ("resource", "shared")]),
            section("b", &[("backend", "external")]),
            section("c", &[("backend", "ldap"), ("resource", "shared")]),
        ]
        .into_iter()
        .collect();
        assert_eq!(backends_using_resource(&doc, "shared"), vec!["a", "c"]);
        assert!(backends_using_resource(&doc, "other").is_empty());
    }
}
