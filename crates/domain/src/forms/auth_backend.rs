//! Create/edit form for entries of the `authentication` store.

use crate::backend::{
    AuthBackend, BackendKind, DEFAULT_LDAP_USER_CLASS, DEFAULT_LDAP_USER_NAME_ATTRIBUTE,
};
use crate::error::ValidationError;
use crate::form::{Field, FormSpec, Submission, Validator};
use crate::forms::{NAME, section_from_submission, submission_from_section, submitted_name};
use crate::resource::Resource;

pub const BACKEND: &str = "backend";
pub const RESOURCE: &str = "resource";
pub const USER_CLASS: &str = "user_class";
pub const USER_NAME_ATTRIBUTE: &str = "user_name_attribute";
pub const BASE_DN: &str = "base_dn";
pub const STRIP_USERNAME_REGEXP: &str = "strip_username_regexp";
pub const SKIP_VALIDATION: &str = "skip_validation";

fn resource_names<'a>(resources: &'a [Resource], type_name: &str) -> Vec<&'a str> {
    resources
        .iter()
        .filter(|resource| resource.type_name() == type_name)
        .map(|resource| resource.name.as_str())
        .collect()
}

/// The backend types that can be configured with the given resources.
///
/// `db` and `ldap` need at least one resource of their kind; `external`
/// is always available.
#[must_use]
pub fn available_types(resources: &[Resource]) -> Vec<(&'static str, &'static str)> {
    let mut types = Vec::with_capacity(3);
    if !resource_names(resources, "db").is_empty() {
        types.push(("db", "Database"));
    }
    if !resource_names(resources, "ldap").is_empty() {
        types.push(("ldap", "LDAP"));
    }
    types.push(("external", "External"));
    types
}

/// Build the form.
///
/// `offer_skip_validation` adds the checkbox that bypasses the user-count
/// check; it is shown after that check failed once.
#[must_use]
pub fn build(
    effective: &Submission,
    resources: &[Resource],
    offer_skip_validation: bool,
) -> FormSpec {
    let types = available_types(resources);
    let selected = effective
        .get_non_empty(BACKEND)
        .or_else(|| types.first().map(|(key, _)| *key))
        .unwrap_or("external");

    let mut form = FormSpec::new("config_auth_backend", "Save Changes");
    form.push(
        Field::text(NAME)
            .label("Backend Name")
            .description("The name of this authentication backend")
            .required(true),
    );
    form.push(
        Field::select(BACKEND)
            .label("Backend Type")
            .description("The type of the resource to use for this authentication backend")
            .required(true)
            .options(types.iter().copied())
            .value(selected),
    );

    match selected {
        "db" => form.push(
            Field::select(RESOURCE)
                .label("Database Connection")
                .description("The database connection to use for authenticating users")
                .required(true)
                .options(resource_names(resources, "db").into_iter().map(|n| (n, n))),
        ),
        "ldap" => {
            form.push(
                Field::select(RESOURCE)
                    .label("LDAP Connection")
                    .description("The LDAP connection to use for authenticating users")
                    .required(true)
                    .options(resource_names(resources, "ldap").into_iter().map(|n| (n, n))),
            );
            form.push(
                Field::text(USER_CLASS)
                    .label("LDAP User Object Class")
                    .description("The object class used for storing users on the LDAP server")
                    .required(true)
                    .value(DEFAULT_LDAP_USER_CLASS),
            );
            form.push(
                Field::text(USER_NAME_ATTRIBUTE)
                    .label("LDAP User Name Attribute")
                    .description(
                        "The attribute name used for storing the user name on the LDAP server",
                    )
                    .required(true)
                    .value(DEFAULT_LDAP_USER_NAME_ATTRIBUTE),
            );
            form.push(
                Field::text(BASE_DN)
                    .label("Base DN")
                    .description("The path where users can be found on the LDAP server"),
            );
        }
        _ => form.push(
            Field::text(STRIP_USERNAME_REGEXP)
                .label("Filter Pattern")
                .description(
                    "The regular expression to use to strip specific parts off from the \
                     user name. Leave empty if you do not want to strip off anything",
                )
                .validator(Validator::Regex),
        ),
    }

    if offer_skip_validation {
        form.push(
            Field::checkbox(SKIP_VALIDATION)
                .label("Skip Validation")
                .description(
                    "Check this to not to validate authentication using this backend",
                ),
        );
    }

    form.populate(effective);
    form
}

/// Whether `submission` asks to bypass the user-count check.
#[must_use]
pub fn skip_validation(submission: &Submission) -> bool {
    submission.get_non_empty(SKIP_VALIDATION).is_some()
}

/// Whether a backend of this kind is checked for reporting users.
#[must_use]
pub fn requires_user_check(backend: &AuthBackend) -> bool {
    !matches!(backend.kind, BackendKind::External { .. })
}

/// Convert a validated submission into a backend.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] without a name, or the parse error
/// of the assembled section.
pub fn to_backend(
    form: &FormSpec,
    submission: &Submission,
) -> Result<AuthBackend, ValidationError> {
    let name = submitted_name(submission).ok_or(ValidationError::EmptyName)?;
    let section = section_from_submission(&name, form, submission, &[SKIP_VALIDATION]);
    AuthBackend::from_section(&section)
}

/// Pre-fill values for editing `backend`.
#[must_use]
pub fn from_backend(backend: &AuthBackend) -> Submission {
    submission_from_section(&backend.to_section())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    fn resources() -> Vec<Resource> {
        vec![
            Resource {
                name: "ldap_dir".to_string(),
                kind: ResourceKind::Ldap(crate::resource::LdapResource {
                    hostname: "localhost".to_string(),
                    port: 389,
                    root_dn: "dc=example,dc=com".to_string(),
                    bind_dn: None,
                    bind_pw: None,
                }),
            },
            Resource {
                name: "live".to_string(),
                kind: ResourceKind::Livestatus {
                    socket: "/tmp/live".to_string(),
                },
            },
        ]
    }

    #[test]
    fn should_offer_only_types_with_matching_resources() {
        let types: Vec<_> = available_types(&resources()).into_iter().map(|(k, _)| k).collect();
        assert_eq!(types, vec!["ldap", "external"]);
        let types: Vec<_> = available_types(&[]).into_iter().map(|(k, _)| k).collect();
        assert_eq!(types, vec!["external"]);
    }

    #[test]
    fn should_default_to_first_available_type() {
        let form = build(&Submission::new(), &resources(), false);
        assert_eq!(form.field(BACKEND).unwrap().value.as_deref(), Some("ldap"));
        assert!(form.has_field(USER_CLASS));
        let options = &form.field(RESOURCE).unwrap().options;
        assert_eq!(options, &vec![("ldap_dir".to_string(), "ldap_dir".to_string())]);
        assert!(!form.has_field(SKIP_VALIDATION));
    }

    #[test]
    fn should_reject_invalid_strip_pattern() {
        let sub = Submission::new()
            .with(NAME, "autologin")
            .with(BACKEND, "external")
            .with(STRIP_USERNAME_REGEXP, "[");
        let mut form = build(&sub, &resources(), false);
        assert!(!form.validate(&sub));
        assert!(form.field(STRIP_USERNAME_REGEXP).unwrap().has_errors());
    }

    #[test]
    fn should_convert_submission_into_backend() {
        let sub = Submission::new()
            .with(NAME, " dir ")
            .with(BACKEND, "ldap")
            .with(RESOURCE, "ldap_dir")
            .with(USER_CLASS, "person")
            .with(USER_NAME_ATTRIBUTE, "cn")
            .with(SKIP_VALIDATION, "1");
        let mut form = build(&sub, &resources(), true);
        assert!(form.validate(&sub));
        assert!(skip_validation(&sub));
        let backend = to_backend(&form, &sub).unwrap();
        assert_eq!(backend.name, "dir");
        assert_eq!(
            backend.kind,
            BackendKind::Ldap {
                resource: "ldap_dir".to_string(),
                user_class: "person".to_string(),
                user_name_attribute: "cn".to_string(),
                base_dn: None,
            }
        );
        assert!(requires_user_check(&backend));
        assert!(backend.to_section().get(SKIP_VALIDATION).is_none());
    }

    #[test]
    fn should_prefill_from_existing_backend() {
        let backend = AuthBackend {
            name: "autologin".to_string(),
            kind: BackendKind::External {
                strip_username_regexp: Some("@.*".to_string()),
            },
        };
        let sub = from_backend(&backend);
        assert_eq!(sub.get(NAME), Some("autologin"));
        assert_eq!(sub.get(STRIP_USERNAME_REGEXP), Some("@.*"));
        assert!(!requires_user_check(&backend));
    }
}
