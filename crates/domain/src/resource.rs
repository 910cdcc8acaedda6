//! Resource: a named connection configuration usable by backends.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::document::{ConfigDocument, ConfigSection};
use crate::error::ValidationError;

/// Default port of an LDAP directory.
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// SQL driver of a database resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    Mysql,
    Pgsql,
    Sqlite,
}

impl DbType {
    pub const ALL: [Self; 3] = [Self::Mysql, Self::Pgsql, Self::Sqlite];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Pgsql => "pgsql",
            Self::Sqlite => "sqlite",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Mysql => "MySQL",
            Self::Pgsql => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" => Ok(Self::Mysql),
            "pgsql" => Ok(Self::Pgsql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ValidationError::InvalidValue {
                key: "db",
                value: other.to_string(),
            }),
        }
    }
}

/// Connection parameters of a SQL database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbResource {
    pub db: DbType,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database name, or the file path for `SQLite`.
    pub dbname: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Connection parameters of an LDAP directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapResource {
    pub hostname: String,
    pub port: u16,
    pub root_dn: String,
    pub bind_dn: Option<String>,
    pub bind_pw: Option<String>,
}

/// The kind-specific part of a [`Resource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Db(DbResource),
    Ldap(LdapResource),
    Livestatus { socket: String },
    File { filename: String, fields: String },
}

impl ResourceKind {
    /// Value of the `type` key.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Db(_) => "db",
            Self::Ldap(_) => "ldap",
            Self::Livestatus { .. } => "livestatus",
            Self::File { .. } => "file",
        }
    }
}

/// A named connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
}

impl Resource {
    /// Parse a resource from its configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingKey`] or
    /// [`ValidationError::InvalidValue`] when the section is incomplete or
    /// carries an unknown `type`.
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
        let optional = |key: &str| section.get_non_empty(key).map(str::to_string);
        let port = |key: &'static str| {
            section
                .get_non_empty(key)
                .map(|value| {
                    value.parse::<u16>().map_err(|_| ValidationError::InvalidValue {
                        key,
                        value: value.to_string(),
                    })
                })
                .transpose()
        };

        let kind = match required("type")?.as_str() {
            "db" => ResourceKind::Db(DbResource {
                db: required("db")?.parse()?,
                host: optional("host"),
                port: port("port")?,
                dbname: required("dbname")?,
                username: optional("username"),
                password: optional("password"),
            }),
            "ldap" => ResourceKind::Ldap(LdapResource {
                hostname: required("hostname")?,
                port: port("port")?.unwrap_or(DEFAULT_LDAP_PORT),
                root_dn: required("root_dn")?,
                bind_dn: optional("bind_dn"),
                bind_pw: optional("bind_pw"),
            }),
            "livestatus" => ResourceKind::Livestatus {
                socket: required("socket")?,
            },
            "file" => ResourceKind::File {
                filename: required("filename")?,
                fields: required("fields")?,
            },
            other => {
                return Err(ValidationError::InvalidValue {
                    key: "type",
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
        let mut put = |key: &str, value: Option<&String>| {
            if let Some(value) = value {
                values.insert(key.to_string(), value.clone());
            }
        };
        match &self.kind {
            ResourceKind::Db(db) => {
                put("db", Some(&db.db.to_string()));
                put("host", db.host.as_ref());
                put("port", db.port.map(|p| p.to_string()).as_ref());
                put("dbname", Some(&db.dbname));
                put("username", db.username.as_ref());
                put("password", db.password.as_ref());
            }
            ResourceKind::Ldap(ldap) => {
                put("hostname", Some(&ldap.hostname));
                put("port", Some(&ldap.port.to_string()));
                put("root_dn", Some(&ldap.root_dn));
                put("bind_dn", ldap.bind_dn.as_ref());
                put("bind_pw", ldap.bind_pw.as_ref());
            }
            ResourceKind::Livestatus { socket } => put("socket", Some(socket)),
            ResourceKind::File { filename, fields } => {
                put("filename", Some(filename));
                put("fields", Some(fields));
            }
        }
        values.insert("type".to_string(), self.kind.type_name().to_string());
        ConfigSection::with_values(self.name.clone(), values)
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Parse every resource in `doc`, skipping sections that do not parse.
#[must_use]
pub fn parse_all(doc: &ConfigDocument) -> Vec<Resource> {
    doc.sections()
        .filter_map(|section| Resource::from_section(section).ok())
        .collect()
}

/// Names of all resources of the given `type` in `doc`.
#[must_use]
pub fn names_of_type(doc: &ConfigDocument, type_name: &str) -> Vec<String> {
    doc.sections()
        .filter(|section| section.get("type") == Some(type_name))
        .map(|section| section.name().to_string())
        .collect()
}
