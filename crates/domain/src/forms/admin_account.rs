//! Setup wizard page defining the initial administrative account.
//!
//! The offered options depend on the authentication backend:
//!
//! | backend    | by name              | existing user   | new user + password |
//! |------------|----------------------|-----------------|---------------------|
//! | external   | yes                  | no              | no                  |
//! | `ldap`     | yes                  | iff ≥ 1 user    | no                  |
//! | `db`       | no                   | iff ≥ 1 user    | yes                 |
//!
//! With more than one option a `user_type` radio is rendered; with exactly
//! one the choice is carried in a hidden `user_type` field.

use regex::Regex;

use crate::backend::{AuthBackend, BackendKind};
use crate::form::{Field, FormSpec, Submission, Validator};

pub const USER_TYPE: &str = "user_type";
pub const BY_NAME: &str = "by_name";
pub const EXISTING_USER: &str = "existing_user";
pub const NEW_USER: &str = "new_user";
pub const NEW_USER_PASSWORD: &str = "new_user_password";
pub const NEW_USER_2NDPASS: &str = "new_user_2ndpass";

pub const DUPLICATE_USERNAME_MESSAGE: &str = "Username already exists.";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "The two given passwords do not match.";

/// Users reported by a backend.
///
/// Fetching is fail-open: any error while listing yields the empty list, so
/// an unreachable backend never blocks the setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserList {
    users: Vec<String>,
}

impl UserList {
    #[must_use]
    pub fn new(users: Vec<String>) -> Self {
        Self { users }
    }

    /// Map a fetch result onto a list, treating failure as "no users".
    #[must_use]
    pub fn from_fetch<E>(result: Result<Vec<String>, E>) -> Self {
        result.map(Self::new).unwrap_or_default()
    }

    /// Exact-match membership test.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.iter().any(|user| user == username)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }
}

/// The account chosen on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAccount {
    /// A name authenticated elsewhere or created later.
    ByName(String),
    /// A user the backend already knows.
    ExistingUser(String),
    /// A user to create in the database backend.
    NewUser { username: String, password: String },
}

impl AdminAccount {
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::ByName(name) | Self::ExistingUser(name) => name,
            Self::NewUser { username, .. } => username,
        }
    }
}

/// Remove every match of `pattern` from `remote_user`.
///
/// The pattern was validated when the backend was configured; one that no
/// longer compiles leaves the name untouched.
#[must_use]
pub fn strip_username(remote_user: &str, pattern: Option<&str>) -> String {
    match pattern
        .filter(|p| !p.is_empty())
        .and_then(|p| Regex::new(p).ok())
    {
        Some(re) => re.replace_all(remote_user, "").into_owned(),
        None => remote_user.to_string(),
    }
}

/// The option keys and labels available for `kind`, in display order.
#[must_use]
pub fn choices(kind: &BackendKind, users: &UserList) -> Vec<(&'static str, &'static str)> {
    let by_name = (BY_NAME, "By Name");
    let existing = (EXISTING_USER, "Existing User");
    let new_user = (NEW_USER, "New User");
    match kind {
        BackendKind::External { .. } => vec![by_name],
        BackendKind::Ldap { .. } if users.is_empty() => vec![by_name],
        BackendKind::Ldap { .. } => vec![by_name, existing],
        BackendKind::Db { .. } if users.is_empty() => vec![new_user],
        BackendKind::Db { .. } => vec![existing, new_user],
    }
}

/// Build the page for `backend`.
///
/// `remote_user` is the name supplied by the web server, used to pre-fill
/// the "by name" option.
#[must_use]
pub fn build(
    backend: &AuthBackend,
    users: &UserList,
    submission: &Submission,
    remote_user: Option<&str>,
) -> FormSpec {
    let choices = choices(&backend.kind, users);
    let selected = |key: &str| submission.is(USER_TYPE, key);

    let mut form = FormSpec::new("setup_admin_account", "Next");
    form.push(Field::note("title", "Administration"));
    form.push(Field::note(
        "description",
        if choices.len() > 1 {
            "Now it's time to configure your first administrative account. \
             Below are several options you can choose from. Select one and follow its instructions:"
        } else {
            "Now it's time to configure your first administrative account. \
             Please follow the instructions below:"
        },
    ));

    if let [(only, _)] = choices.as_slice() {
        form.push(Field::hidden(USER_TYPE, *only).required(true));
    } else {
        form.push(
            Field::radio(USER_TYPE)
                .required(true)
                .options(choices.iter().copied()),
        );
    }

    for (key, _) in &choices {
        match *key {
            BY_NAME => {
                let strip = match &backend.kind {
                    BackendKind::External {
                        strip_username_regexp,
                    } => strip_username_regexp.as_deref(),
                    _ => None,
                };
                let prefill = remote_user
                    .map(|name| strip_username(name, strip))
                    .unwrap_or_default();
                form.push(
                    Field::text(BY_NAME)
                        .label("Username")
                        .description(
                            "Define the initial administrative account by providing a username \
                             that reflects a user created later or one that is authenticated \
                             using external mechanisms",
                        )
                        .required(selected(BY_NAME))
                        .value(prefill),
                );
            }
            EXISTING_USER => form.push(
                Field::select(EXISTING_USER)
                    .label("Username")
                    .description(format!(
                        "Choose a user reported by the {} backend as the initial \
                         administrative account",
                        backend.kind.label()
                    ))
                    .required(selected(EXISTING_USER))
                    .options(users.iter().map(|user| (user, user))),
            ),
            NEW_USER => {
                let required = selected(NEW_USER);
                form.push(
                    Field::text(NEW_USER)
                        .label("Username")
                        .description(
                            "Enter the username to be used when creating an initial \
                             administrative account",
                        )
                        .required(required),
                );
                form.push(
                    Field::password(NEW_USER_PASSWORD)
                        .label("Password")
                        .description("Enter the password to assign to the newly created account")
                        .required(required),
                );
                form.push(
                    Field::password(NEW_USER_2NDPASS)
                        .label("Repeat password")
                        .description(
                            "Please repeat the password given above to avoid typing errors",
                        )
                        .required(required)
                        .validator(Validator::Identical {
                            other: NEW_USER_PASSWORD,
                            message: PASSWORD_MISMATCH_MESSAGE,
                        }),
                );
            }
            _ => {}
        }
    }

    form.populate(submission);
    form
}

/// Validate `submission` against `form` and extract the chosen account.
///
/// A new user whose name already appears in `users` is rejected with
/// [`DUPLICATE_USERNAME_MESSAGE`] on the `new_user` field.
pub fn process(
    form: &mut FormSpec,
    submission: &Submission,
    users: &UserList,
) -> Option<AdminAccount> {
    if !form.validate(submission) {
        return None;
    }

    let value = |key: &str| submission.get_non_empty(key).map(|v| v.trim().to_string());
    let account = match submission.get(USER_TYPE).unwrap_or_default() {
        BY_NAME => value(BY_NAME).map(AdminAccount::ByName),
        EXISTING_USER => value(EXISTING_USER).map(AdminAccount::ExistingUser),
        NEW_USER => {
            let username = value(NEW_USER)?;
            if users.contains(&username) {
                form.add_error(NEW_USER, DUPLICATE_USERNAME_MESSAGE);
                return None;
            }
            let password = submission.get(NEW_USER_PASSWORD).unwrap_or_default();
            Some(AdminAccount::NewUser {
                username,
                password: password.to_string(),
            })
        }
        _ => None,
    };

    if account.is_none() {
        form.add_error(USER_TYPE, "Please choose how to define the account.");
    }
    account
}
