//! General application settings stored in the `config` store.
//!
//! Field keys map onto `section.key` by splitting at the first underscore,
//! so `logging_file` is the `file` key of the `[logging]` section.

use std::collections::BTreeMap;

use crate::document::{ConfigDocument, ConfigSection};
use crate::form::{Field, FormSpec, Submission};

pub const GLOBAL_MODULE_PATH: &str = "global_module_path";
pub const PREFERENCES_TYPE: &str = "preferences_type";
pub const PREFERENCES_RESOURCE: &str = "preferences_resource";
pub const LOGGING_LOG: &str = "logging_log";
pub const LOGGING_LEVEL: &str = "logging_level";
pub const LOGGING_APPLICATION: &str = "logging_application";
pub const LOGGING_FILE: &str = "logging_file";

pub const DEFAULT_MODULE_PATH: &str = "/usr/share/dashconf/modules";
pub const DEFAULT_LOG_APPLICATION: &str = "dashconf";
pub const DEFAULT_LOG_FILE: &str = "/var/log/dashconf/dashconf.log";

/// Sections owned by this form; saving rewrites them entirely.
const SECTIONS: [&str; 3] = ["global", "preferences", "logging"];

fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('_')
}

/// Flatten the stored document into form values.
#[must_use]
pub fn from_document(doc: &ConfigDocument) -> Submission {
    doc.sections()
        .filter(|section| SECTIONS.contains(&section.name()))
        .flat_map(|section| {
            section
                .iter()
                .map(move |(key, value)| (format!("{}_{key}", section.name()), value.to_string()))
        })
        .collect()
}

/// Build the form for the current values.
///
/// `db_resources` are the names of the SQL resources preferences may be
/// stored in.
#[must_use]
pub fn build(effective: &Submission, db_resources: &[String]) -> FormSpec {
    let mut form = FormSpec::new("config_application", "Save Changes");

    form.push(
        Field::text(GLOBAL_MODULE_PATH)
            .label("Module Path")
            .description(
                "Contains the directories that will be searched for available modules, \
                 separated by colons",
            )
            .required(true)
            .value(DEFAULT_MODULE_PATH),
    );

    form.push(
        Field::select(PREFERENCES_TYPE)
            .label("User Preference Storage Type")
            .required(true)
            .options([
                ("ini", "File System (INI Files)"),
                ("db", "Database"),
                ("none", "Don't Store Preferences"),
            ])
            .value("ini"),
    );
    if effective.is(PREFERENCES_TYPE, "db") {
        form.push(
            Field::select(PREFERENCES_RESOURCE)
                .label("Database Connection")
                .description("The database connection to use for storing preferences")
                .required(true)
                .options(db_resources.iter().map(|name| (name.as_str(), name.as_str()))),
        );
    }

    form.push(
        Field::select(LOGGING_LOG)
            .label("Logging Type")
            .required(true)
            .options([("syslog", "Syslog"), ("file", "File"), ("none", "None")])
            .value("syslog"),
    );
    let log = effective.get(LOGGING_LOG).unwrap_or("syslog");
    if log != "none" {
        form.push(
            Field::select(LOGGING_LEVEL)
                .label("Logging Level")
                .description("The maximum logging level to emit")
                .required(true)
                .options([
                    ("ERROR", "Error"),
                    ("WARNING", "Warning"),
                    ("INFO", "Information"),
                    ("DEBUG", "Debug"),
                ])
                .value("ERROR"),
        );
    }
    match log {
        "syslog" => form.push(
            Field::text(LOGGING_APPLICATION)
                .label("Application Prefix")
                .description("The name of the application by which to prefix syslog messages")
                .required(true)
                .value(DEFAULT_LOG_APPLICATION),
        ),
        "file" => form.push(
            Field::text(LOGGING_FILE)
                .label("File path")
                .description("The full path to the log file to write messages to")
                .required(true)
                .value(DEFAULT_LOG_FILE),
        ),
        _ => {}
    }

    form.populate(effective);
    form
}

/// Write the submitted values into `doc`.
///
/// The `global`, `preferences` and `logging` sections are replaced by what
/// the form submitted, dropping keys of fields that are no longer shown.
/// Other sections are left alone.
pub fn apply(doc: &mut ConfigDocument, form: &FormSpec, submission: &Submission) {
    let mut sections: BTreeMap<&str, BTreeMap<String, String>> = BTreeMap::new();
    for (key, value) in form.values(submission) {
        if let Some((section, name)) = split_key(key) {
            sections
                .entry(section)
                .or_default()
                .insert(name.to_string(), value.trim().to_string());
        }
    }
    for name in SECTIONS {
        match sections.remove(name) {
            Some(values) => doc.set_section(ConfigSection::with_values(name, values)),
            None => {
                doc.remove_section(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        doc.set("global", "module_path", "/opt/modules");
        doc.set("logging", "log", "file");
        doc.set("logging", "level", "INFO");
        doc.set("logging", "file", "/tmp/dash.log");
        doc.set("custom", "keep", "me");
        doc
    }

    #[test]
    fn should_flatten_document_into_prefixed_keys() {
        let values = from_document(&stored());
        assert_eq!(values.get(GLOBAL_MODULE_PATH), Some("/opt/modules"));
        assert_eq!(values.get(LOGGING_FILE), Some("/tmp/dash.log"));
        assert_eq!(values.get("custom_keep"), None);
    }

    #[test]
    fn should_show_fields_matching_logging_type() {
        let form = build(&from_document(&stored()), &[]);
        assert!(form.has_field(LOGGING_FILE));
        assert!(!form.has_field(LOGGING_APPLICATION));
        assert_eq!(
            form.field(LOGGING_LEVEL).unwrap().value.as_deref(),
            Some("INFO")
        );

        let none = build(&Submission::new().with(LOGGING_LOG, "none"), &[]);
        assert!(!none.has_field(LOGGING_LEVEL));
        assert!(!none.has_field(LOGGING_FILE));
    }

    #[test]
    fn should_require_resource_for_database_preferences() {
        let sub = Submission::new()
            .with(GLOBAL_MODULE_PATH, "/m")
            .with(PREFERENCES_TYPE, "db")
            .with(LOGGING_LOG, "none");
        let mut form = build(&sub, &["prefs".to_string()]);
        assert!(!form.validate(&sub));
        assert!(form.field(PREFERENCES_RESOURCE).unwrap().has_errors());
    }

    #[test]
    fn should_rewrite_owned_sections_and_keep_others() {
        let mut doc = stored();
        let sub = Submission::new()
            .with(GLOBAL_MODULE_PATH, "/srv/modules")
            .with(PREFERENCES_TYPE, "ini")
            .with(LOGGING_LOG, "syslog")
            .with(LOGGING_LEVEL, "ERROR")
            .with(LOGGING_APPLICATION, "dash");
        let mut form = build(&sub, &[]);
        assert!(form.validate(&sub));
        apply(&mut doc, &form, &sub);

        assert_eq!(doc.get("global", "module_path"), Some("/srv/modules"));
        assert_eq!(doc.get("preferences", "type"), Some("ini"));
        assert_eq!(doc.get("logging", "application"), Some("dash"));
        assert_eq!(doc.get("logging", "file"), None);
        assert_eq!(doc.get("custom", "keep"), Some("me"));
    }
}
