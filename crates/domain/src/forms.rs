//! Concrete form builders.
//!
//! Every builder is a pure function of the current ("effective") values and
//! whatever context the form needs, returning a [`FormSpec`](crate::form::FormSpec).
//! The effective values are the submission on POST and the stored
//! configuration on GET, so conditional fields follow what the user picked.

pub mod admin_account;
pub mod application;
pub mod auth_backend;
pub mod monitoring_backend;
pub mod resource;

use crate::document::ConfigSection;
use crate::form::{FormSpec, Submission};

/// Field holding the section name in backend and resource forms.
pub const NAME: &str = "name";

/// The single-button confirmation form shown before removals.
#[must_use]
pub fn confirm_removal() -> FormSpec {
    FormSpec::new("confirm_removal", "Confirm Removal")
}

/// Build a section called `name` from the non-blank submitted values of
/// `form`'s input fields, excluding the name field itself.
pub(crate) fn section_from_submission(
    name: &str,
    form: &FormSpec,
    submission: &Submission,
    exclude: &[&str],
) -> ConfigSection {
    let mut section = ConfigSection::new(name);
    for (key, value) in form.values(submission) {
        if key != NAME && !exclude.contains(&key) {
            section.set(key, value.trim());
        }
    }
    section
}

/// The inverse of [`section_from_submission`]: a submission pre-filled with
/// the stored values plus the section name.
#[must_use]
pub fn submission_from_section(section: &ConfigSection) -> Submission {
    let mut submission: Submission = section.iter().collect();
    submission.set(NAME, section.name());
    submission
}

/// Validate the name field of a backend or resource form.
pub(crate) fn submitted_name(submission: &Submission) -> Option<String> {
    submission
        .get_non_empty(NAME)
        .map(|name| name.trim().to_string())
}
