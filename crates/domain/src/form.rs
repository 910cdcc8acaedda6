//! Declarative forms.
//!
//! A [`FormSpec`] is a plain list of typed [`Field`] descriptors produced by
//! a pure builder function. The HTTP layer renders it by matching on
//! [`FieldKind`]; validation runs against a [`Submission`] and attaches
//! messages to the offending fields.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Message attached to empty required fields.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// The closed set of widgets a form may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Password,
    Select,
    Radio,
    Hidden,
    /// Read-only text; never submitted.
    Note,
    Checkbox,
}

impl FieldKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Hidden => "hidden",
            Self::Note => "note",
            Self::Checkbox => "checkbox",
        }
    }
}

/// Extra checks applied to a non-empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// The value must equal the submitted value of another field.
    Identical {
        other: &'static str,
        message: &'static str,
    },
    /// The value must compile as a regular expression.
    Regex,
    /// The value must be a TCP port number.
    Port,
}

impl Validator {
    fn check(&self, value: &str, submission: &Submission) -> Result<(), String> {
        match self {
            Self::Identical { other, message } => {
                if submission.get(other).unwrap_or_default() == value {
                    Ok(())
                } else {
                    Err((*message).to_string())
                }
            }
            Self::Regex => regex::Regex::new(value)
                .map(|_| ())
                .map_err(|_| format!("\"{value}\" is not a valid regular expression.")),
            Self::Port => match value.parse::<u16>() {
                Ok(port) if port > 0 => Ok(()),
                _ => Err("Port must be a number between 1 and 65535.".to_string()),
            },
        }
    }
}

/// Submitted form data: field name → raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Submission(BTreeMap<String, String>);

impl Submission {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get) but treats blank values as absent.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    /// Whether `key` carries the value `expected`.
    #[must_use]
    pub fn is(&self, key: &str, expected: &str) -> bool {
        self.get(key) == Some(expected)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Submission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One input widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub kind: FieldKind,
    pub label: String,
    pub description: Option<String>,
    pub required: bool,
    /// Default or current value; for checkboxes `Some` means checked.
    pub value: Option<String>,
    /// `(value, label)` pairs for selects and radios.
    pub options: Vec<(String, String)>,
    pub validators: Vec<Validator>,
    pub errors: Vec<String>,
}

impl Field {
    #[must_use]
    pub fn new(kind: FieldKind, key: &'static str) -> Self {
        Self {
            key,
            kind,
            label: String::new(),
            description: None,
            required: false,
            value: None,
            options: Vec::new(),
            validators: Vec::new(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn text(key: &'static str) -> Self {
        Self::new(FieldKind::Text, key)
    }

    #[must_use]
    pub fn password(key: &'static str) -> Self {
        Self::new(FieldKind::Password, key)
    }

    #[must_use]
    pub fn select(key: &'static str) -> Self {
        Self::new(FieldKind::Select, key)
    }

    #[must_use]
    pub fn radio(key: &'static str) -> Self {
        Self::new(FieldKind::Radio, key)
    }

    #[must_use]
    pub fn hidden(key: &'static str, value: impl Into<String>) -> Self {
        Self::new(FieldKind::Hidden, key).value(value)
    }

    #[must_use]
    pub fn note(key: &'static str, text: impl Into<String>) -> Self {
        Self::new(FieldKind::Note, key).value(text)
    }

    #[must_use]
    pub fn checkbox(key: &'static str) -> Self {
        Self::new(FieldKind::Checkbox, key)
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(v, l)| (v.into(), l.into()))
            .collect();
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind.as_str()
    }

    #[must_use]
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// Whether `option` is the current value of this select or radio.
    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        self.value.as_deref() == Some(option)
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.value.is_some()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn accepts_option(&self, value: &str) -> bool {
        self.options.iter().any(|(option, _)| option == value)
    }

    fn validate(&mut self, submission: &Submission) {
        let value = submission.get(self.key).unwrap_or_default();
        if value.trim().is_empty() {
            if self.required {
                self.errors.push(REQUIRED_MESSAGE.to_string());
            }
            return;
        }
        if matches!(self.kind, FieldKind::Select | FieldKind::Radio) && !self.accepts_option(value)
        {
            self.errors.push(format!("\"{value}\" is not a valid choice."));
            return;
        }
        if self.kind == FieldKind::Hidden
            && self.value.as_deref().is_some_and(|expected| expected != value)
        {
            self.errors.push(format!("\"{value}\" is not a valid choice."));
            return;
        }
        for validator in &self.validators {
            if let Err(message) = validator.check(value, submission) {
                self.errors.push(message);
            }
        }
    }
}

/// A complete form: its fields plus form-level errors and advisory warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub name: &'static str,
    pub submit_label: &'static str,
    pub fields: Vec<Field>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FormSpec {
    #[must_use]
    pub fn new(name: &'static str, submit_label: &'static str) -> Self {
        Self {
            name,
            submit_label,
            fields: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.push(field);
        self
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.key == key)
    }

    #[must_use]
    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Keys of all fields, in order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.key).collect()
    }

    /// Keys of the fields that accept input (everything except notes).
    #[must_use]
    pub fn input_keys(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|field| field.kind != FieldKind::Note)
            .map(|field| field.key)
            .collect()
    }

    /// Copy submitted values into the fields so a re-rendered form shows
    /// what the user typed. Passwords, notes and hidden fields keep their
    /// builder-provided values.
    pub fn populate(&mut self, submission: &Submission) {
        for field in &mut self.fields {
            match field.kind {
                FieldKind::Note | FieldKind::Hidden | FieldKind::Password => {}
                FieldKind::Checkbox => {
                    field.value = submission.get_non_empty(field.key).map(str::to_string);
                }
                FieldKind::Text | FieldKind::Select | FieldKind::Radio => {
                    if let Some(value) = submission.get(field.key) {
                        field.value = Some(value.to_string());
                    }
                }
            }
        }
    }

    /// Attach `message` to the field `key`, or to the form when no such
    /// field exists.
    pub fn add_error(&mut self, key: &str, message: impl Into<String>) {
        let message = message.into();
        match self.field_mut(key) {
            Some(field) => field.errors.push(message),
            None => self.errors.push(message),
        }
    }

    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.fields.iter().any(Field::has_errors)
    }

    /// Populate from `submission` and run every field's checks.
    ///
    /// Returns `true` when no field or form error was recorded.
    pub fn validate(&mut self, submission: &Submission) -> bool {
        self.populate(submission);
        for field in &mut self.fields {
            if field.kind != FieldKind::Note {
                field.validate(submission);
            }
        }
        !self.has_errors()
    }

    /// Non-blank submitted values of this form's input fields.
    #[must_use]
    pub fn values(&self, submission: &Submission) -> BTreeMap<&'static str, String> {
        self.fields
            .iter()
            .filter(|field| field.kind != FieldKind::Note)
            .filter_map(|field| {
                submission
                    .get_non_empty(field.key)
                    .map(|value| (field.key, value.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_form() -> FormSpec {
        FormSpec::new("test", "Save")
            .with_field(Field::text("name").required(true))
            .with_field(Field::password("pw").required(true))
            .with_field(Field::password("pw2").required(true).validator(
                Validator::Identical {
                    other: "pw",
                    message: "The passwords do not match.",
                },
            ))
            .with_field(
                Field::select("type")
                    .required(true)
                    .options([("db", "Database"), ("ldap", "LDAP")]),
            )
    }

    #[test]
    fn should_flag_missing_required_fields() {
        let mut form = password_form();
        assert!(!form.validate(&Submission::new()));
        assert_eq!(form.field("name").unwrap().errors, vec![REQUIRED_MESSAGE]);
    }

    #[test]
    fn should_reject_mismatched_identical_values() {
        let mut form = password_form();
        let sub = Submission::new()
            .with("name", "a")
            .with("pw", "secret")
            .with("pw2", "secrets")
            .with("type", "db");
        assert!(!form.validate(&sub));
        assert_eq!(
            form.field("pw2").unwrap().errors,
            vec!["The passwords do not match."]
        );
    }

    #[test]
    fn should_reject_unknown_select_option() {
        let mut form = password_form();
        let sub = Submission::new()
            .with("name", "a")
            .with("pw", "x")
            .with("pw2", "x")
            .with("type", "kerberos");
        assert!(!form.validate(&sub));
        assert!(form.field("type").unwrap().has_errors());
    }

    #[test]
    fn should_accept_complete_submission() {
        let mut form = password_form();
        let sub = Submission::new()
            .with("name", "a")
            .with("pw", "x")
            .with("pw2", "x")
            .with("type", "ldap");
        assert!(form.validate(&sub));
        assert_eq!(form.field("type").unwrap().value.as_deref(), Some("ldap"));
    }

    #[test]
    fn should_not_echo_passwords_when_populating() {
        let mut form = password_form();
        form.populate(&Submission::new().with("pw", "secret").with("name", "bob"));
        assert_eq!(form.field("pw").unwrap().value, None);
        assert_eq!(form.field("name").unwrap().value.as_deref(), Some("bob"));
    }

    #[test]
    fn should_validate_regex_and_port() {
        let mut form = FormSpec::new("t", "Save")
            .with_field(Field::text("pattern").validator(Validator::Regex))
            .with_field(Field::text("port").validator(Validator::Port));
        let sub = Submission::new().with("pattern", "(").with("port", "70000");
        assert!(!form.validate(&sub));
        assert!(form.field("pattern").unwrap().has_errors());
        assert!(form.field("port").unwrap().has_errors());
    }

    #[test]
    fn should_attach_unknown_key_errors_to_form() {
        let mut form = password_form();
        form.add_error("nope", "Something failed");
        assert_eq!(form.errors, vec!["Something failed"]);
        assert!(form.has_errors());
    }

    #[test]
    fn should_skip_blank_values() {
        let form = password_form();
        let values = form.values(&Submission::new().with("name", "  ").with("type", "db"));
        assert_eq!(values.len(), 1);
        assert_eq!(values["type"], "db");
    }
}
