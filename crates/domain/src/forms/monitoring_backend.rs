//! Setup wizard page naming the monitoring backend.

use crate::document::ConfigSection;
use crate::form::{Field, FormSpec, Submission};
use crate::forms::NAME;

pub const TYPE: &str = "type";
pub const DEFAULT_NAME: &str = "icinga";

/// How monitoring data is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringBackendType {
    /// From the IDO database; needs a SQL resource.
    Ido,
    /// From a livestatus socket.
    Livestatus,
}

impl MonitoringBackendType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ido => "ido",
            Self::Livestatus => "livestatus",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Ido => "IDO",
            Self::Livestatus => "Livestatus",
        }
    }
}

/// The configured monitoring backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringBackend {
    pub name: String,
    pub kind: MonitoringBackendType,
}

impl MonitoringBackend {
    #[must_use]
    pub fn to_section(&self) -> ConfigSection {
        let mut section = ConfigSection::new(self.name.clone());
        section.set(TYPE, self.kind.as_str());
        section
    }
}

/// Build the page. `ido` is only offered when a SQL resource exists.
#[must_use]
pub fn build(effective: &Submission, ido_available: bool) -> FormSpec {
    let types: Vec<MonitoringBackendType> = if ido_available {
        vec![MonitoringBackendType::Ido, MonitoringBackendType::Livestatus]
    } else {
        vec![MonitoringBackendType::Livestatus]
    };

    let mut form = FormSpec::new("setup_monitoring_backend", "Next");
    form.push(Field::note("title", "Monitoring Backend"));
    form.push(Field::note(
        "description",
        "Please configure below how the monitoring module should retrieve monitoring information.",
    ));
    form.push(
        Field::text(NAME)
            .label("Backend Name")
            .description("The identifier of this backend")
            .required(true)
            .value(DEFAULT_NAME),
    );
    form.push(
        Field::select(TYPE)
            .label("Backend Type")
            .description("The data source used for retrieving monitoring information")
            .required(true)
            .options(types.iter().map(|kind| (kind.as_str(), kind.label())))
            .value(types[0].as_str()),
    );
    form.populate(effective);
    form
}

/// Validate and extract the backend.
pub fn process(form: &mut FormSpec, submission: &Submission) -> Option<MonitoringBackend> {
    if !form.validate(submission) {
        return None;
    }
    let kind = match submission.get(TYPE)? {
        "ido" => MonitoringBackendType::Ido,
        "livestatus" => MonitoringBackendType::Livestatus,
        _ => return None,
    };
    Some(MonitoringBackend {
        name: submission.get_non_empty(NAME)?.trim().to_string(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_offer_ido_only_with_sql_resource() {
        let form = build(&Submission::new(), false);
        let options = &form.field(TYPE).unwrap().options;
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].0, "livestatus");

        let form = build(&Submission::new(), true);
        assert_eq!(form.field(TYPE).unwrap().value.as_deref(), Some("ido"));
        assert_eq!(form.field(NAME).unwrap().value.as_deref(), Some(DEFAULT_NAME));
    }

    #[test]
    fn should_reject_ido_without_sql_resource() {
        let sub = Submission::new().with(NAME, "icinga").with(TYPE, "ido");
        let mut form = build(&sub, false);
        assert_eq!(process(&mut form, &sub), None);
    }

    #[test]
    fn should_extract_backend() {
        let sub = Submission::new().with(NAME, "main").with(TYPE, "livestatus");
        let mut form = build(&sub, true);
        let backend = process(&mut form, &sub).unwrap();
        assert_eq!(backend.to_section().name(), "main");
        assert_eq!(backend.to_section().get(TYPE), Some("livestatus"));
    }
}
