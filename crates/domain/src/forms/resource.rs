//! Create/edit form for entries of the `resources` store.

use crate::error::ValidationError;
use crate::form::{Field, FormSpec, Submission, Validator};
use crate::forms::{NAME, section_from_submission, submission_from_section, submitted_name};
use crate::resource::{DEFAULT_LDAP_PORT, DbType, Resource};

pub const TYPE: &str = "type";
pub const DB: &str = "db";
pub const HOST: &str = "host";
pub const PORT: &str = "port";
pub const DBNAME: &str = "dbname";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const HOSTNAME: &str = "hostname";
pub const ROOT_DN: &str = "root_dn";
pub const BIND_DN: &str = "bind_dn";
pub const BIND_PW: &str = "bind_pw";
pub const SOCKET: &str = "socket";
pub const FILENAME: &str = "filename";
pub const FIELDS: &str = "fields";

/// Secret fields that are never echoed back; left blank on edit they keep
/// the stored value.
const SECRETS: [&str; 2] = [PASSWORD, BIND_PW];

/// Build the form for the resource type selected in `effective`.
#[must_use]
pub fn build(effective: &Submission) -> FormSpec {
    let selected = effective.get_non_empty(TYPE).unwrap_or("db");

    let mut form = FormSpec::new("config_resource", "Save Changes");
    form.push(
        Field::text(NAME)
            .label("Resource Name")
            .description("The unique name of this resource")
            .required(true),
    );
    form.push(
        Field::select(TYPE)
            .label("Resource Type")
            .description("The type of resource")
            .required(true)
            .options([
                ("db", "SQL Database"),
                ("ldap", "LDAP"),
                ("livestatus", "Livestatus"),
                ("file", "File"),
            ])
            .value(selected),
    );

    match selected {
        "ldap" => {
            form.push(
                Field::text(HOSTNAME)
                    .label("Host")
                    .description(
                        "The hostname or address of the LDAP server to use for authentication",
                    )
                    .required(true)
                    .value("localhost"),
            );
            form.push(
                Field::text(PORT)
                    .label("Port")
                    .description("The port of the LDAP server to use for authentication")
                    .required(true)
                    .value(DEFAULT_LDAP_PORT.to_string())
                    .validator(Validator::Port),
            );
            form.push(
                Field::text(ROOT_DN)
                    .label("Root DN")
                    .description(
                        "Only the root and its child nodes will be accessible on this resource.",
                    )
                    .required(true),
            );
            form.push(
                Field::text(BIND_DN)
                    .label("Bind DN")
                    .description("The user dn to use for querying the ldap server"),
            );
            form.push(
                Field::password(BIND_PW)
                    .label("Bind Password")
                    .description("The password to use for querying the ldap server"),
            );
        }
        "livestatus" => form.push(
            Field::text(SOCKET)
                .label("Socket")
                .description("The path to your livestatus socket used for querying monitoring data")
                .required(true)
                .value("/var/run/icinga2/cmd/livestatus"),
        ),
        "file" => {
            form.push(
                Field::text(FILENAME)
                    .label("Filepath")
                    .description("The filename to fetch information from")
                    .required(true),
            );
            form.push(
                Field::text(FIELDS)
                    .label("Pattern")
                    .description("The regular expression by which to identify columns")
                    .required(true)
                    .validator(Validator::Regex),
            );
        }
        _ => {
            let sqlite = effective.is(DB, DbType::Sqlite.as_str());
            form.push(
                Field::select(DB)
                    .label("Database Type")
                    .description("The type of SQL database")
                    .required(true)
                    .options(DbType::ALL.iter().map(|db| (db.as_str(), db.label())))
                    .value(DbType::Mysql.as_str()),
            );
            form.push(
                Field::text(HOST)
                    .label("Host")
                    .description("The hostname of the database")
                    .required(!sqlite)
                    .value("localhost"),
            );
            form.push(
                Field::text(PORT)
                    .label("Port")
                    .description("The port to use")
                    .validator(Validator::Port),
            );
            form.push(
                Field::text(DBNAME)
                    .label("Database Name")
                    .description("The name of the database to use, or the file path for SQLite")
                    .required(true),
            );
            form.push(
                Field::text(USERNAME)
                    .label("Username")
                    .description("The user name to use for authentication")
                    .required(!sqlite),
            );
            form.push(
                Field::password(PASSWORD)
                    .label("Password")
                    .description("The password to use for authentication"),
            );
        }
    }

    form.populate(effective);
    form
}

/// Convert a validated submission into a resource.
///
/// `previous` is the resource being edited; secrets left blank keep its
/// stored values when the type did not change.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] without a name, or the parse error
/// of the assembled section.
pub fn to_resource(
    form: &FormSpec,
    submission: &Submission,
    previous: Option<&Resource>,
) -> Result<Resource, ValidationError> {
    let name = submitted_name(submission).ok_or(ValidationError::EmptyName)?;
    let mut section = section_from_submission(&name, form, submission, &[]);

    if let Some(previous) = previous.map(Resource::to_section)
        && previous.get(TYPE) == section.get(TYPE)
    {
        for key in SECRETS {
            if form.has_field(key)
                && section.get(key).is_none()
                && let Some(stored) = previous.get(key)
            {
                section.set(key, stored);
            }
        }
    }

    Resource::from_section(&section)
}

/// Pre-fill values for editing `resource`.
#[must_use]
pub fn from_resource(resource: &Resource) -> Submission {
    submission_from_section(&resource.to_section())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{DbResource, ResourceKind};

    fn db_submission() -> Submission {
        Submission::new()
            .with(NAME, "web")
            .with(TYPE, "db")
            .with(DB, "pgsql")
            .with(HOST, "db.local")
            .with(PORT, "5432")
            .with(DBNAME, "dashboard")
            .with(USERNAME, "dash")
    }

    #[test]
    fn should_default_to_database_fields() {
        let form = build(&Submission::new());
        assert!(form.has_field(DBNAME));
        assert!(!form.has_field(SOCKET));
        assert!(form.field(HOST).unwrap().required);
    }

    #[test]
    fn should_relax_host_for_sqlite() {
        let form = build(&Submission::new().with(TYPE, "db").with(DB, "sqlite"));
        assert!(!form.field(HOST).unwrap().required);
        assert!(!form.field(USERNAME).unwrap().required);
    }

    #[test]
    fn should_reject_out_of_range_port() {
        let sub = db_submission().with(PORT, "99999");
        let mut form = build(&sub);
        assert!(!form.validate(&sub));
        assert!(form.field(PORT).unwrap().has_errors());
    }

    #[test]
    fn should_keep_stored_password_when_left_blank() {
        let previous = Resource {
            name: "web".to_string(),
            kind: ResourceKind::Db(DbResource {
                db: DbType::Pgsql,
                host: Some("db.local".to_string()),
                port: None,
                dbname: "dashboard".to_string(),
                username: Some("dash".to_string()),
                password: Some("s3cret".to_string()),
            }),
        };
        let sub = db_submission();
        let mut form = build(&sub);
        assert!(form.validate(&sub));
        let resource = to_resource(&form, &sub, Some(&previous)).unwrap();
        match resource.kind {
            ResourceKind::Db(db) => {
                assert_eq!(db.password.as_deref(), Some("s3cret"));
                assert_eq!(db.port, Some(5432));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn should_build_livestatus_resource() {
        let sub = Submission::new()
            .with(NAME, "live")
            .with(TYPE, "livestatus")
            .with(SOCKET, "/run/live");
        let mut form = build(&sub);
        assert!(form.validate(&sub));
        let resource = to_resource(&form, &sub, None).unwrap();
        assert_eq!(
            resource.kind,
            ResourceKind::Livestatus {
                socket: "/run/live".to_string()
            }
        );
        assert_eq!(from_resource(&resource).get(SOCKET), Some("/run/live"));
    }
}
