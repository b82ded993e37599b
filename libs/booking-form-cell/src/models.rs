use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Specialty identifier as selected in the booking form.
///
/// The directory treats it as opaque; it travels back out exactly as it came
/// in, whether the backend uses numeric keys or slugs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecialtyId(String);

impl SpecialtyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpecialtyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for SpecialtyId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SpecialtyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Doctor identifier as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DoctorId(String);

impl DoctorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for DoctorId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for DoctorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// The directory emits numeric ids; other deployments use string keys. Both
// decode to the same opaque representation.
impl<'de> Deserialize<'de> for DoctorId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(i64),
            Text(String),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Number(id) => DoctorId(id.to_string()),
            Wire::Text(id) => DoctorId(id),
        })
    }
}

/// One doctor record from the directory lookup.
///
/// Only `id` and `name` are contractual; the directory also sends
/// `photo_url` and `specialty`, which the form does not use.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorRecord {
    pub id: DoctorId,
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Informational entries shown in a selection control when it has no real
/// choices to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    ChooseSpecialty,
    NoDoctors,
    DoctorsUnavailable,
    ChooseDoctorAndDate,
    NoTimes,
    TimesUnavailable,
}

impl Placeholder {
    pub fn label(&self) -> &'static str {
        match self {
            Placeholder::ChooseSpecialty => "Select a specialty first",
            Placeholder::NoDoctors => "No doctors available",
            Placeholder::DoctorsUnavailable => "Unable to load doctors",
            Placeholder::ChooseDoctorAndDate => "Select a doctor and date first",
            Placeholder::NoTimes => "No available times",
            Placeholder::TimesUnavailable => "Unable to load available times",
        }
    }
}

/// A single entry of a selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selectable: bool,
}

impl SelectOption {
    pub fn item(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selectable: true,
        }
    }

    pub fn placeholder(placeholder: Placeholder) -> Self {
        Self {
            value: String::new(),
            label: placeholder.label().to_string(),
            selectable: false,
        }
    }
}

/// What a selection control currently presents: either a placeholder or the
/// list from the most recently applied lookup, in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectState {
    Placeholder(Placeholder),
    Items(Vec<SelectOption>),
}

impl SelectState {
    pub fn options(&self) -> Vec<SelectOption> {
        match self {
            SelectState::Placeholder(placeholder) => {
                vec![SelectOption::placeholder(*placeholder)]
            }
            SelectState::Items(items) => items.clone(),
        }
    }
}

/// A selection control owned by the form engine.
///
/// The engine task is the only writer; observers see copies through
/// [`FormSnapshot`].
#[derive(Debug, Clone)]
pub struct SelectControl {
    state: SelectState,
}

impl SelectControl {
    pub fn new(placeholder: Placeholder) -> Self {
        Self {
            state: SelectState::Placeholder(placeholder),
        }
    }

    pub fn state(&self) -> &SelectState {
        &self.state
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.state.options()
    }

    pub fn show_placeholder(&mut self, placeholder: Placeholder) {
        self.state = SelectState::Placeholder(placeholder);
    }

    pub fn show_items(&mut self, items: Vec<SelectOption>) {
        self.state = SelectState::Items(items);
    }

    /// Whether `value` is one of the currently offered selectable options.
    pub fn is_selectable(&self, value: &str) -> bool {
        match &self.state {
            SelectState::Placeholder(_) => false,
            SelectState::Items(items) => items
                .iter()
                .any(|option| option.selectable && option.value == value),
        }
    }
}

/// A user-driven change on one of the form's inputs. `None` means the
/// selection was cleared.
#[derive(Debug, Clone)]
pub enum FormEvent {
    SpecialtySelected(Option<SpecialtyId>),
    DoctorSelected(Option<DoctorId>),
    DateSelected(Option<NaiveDate>),
}

/// Observer-visible copy of the form's selection controls.
///
/// `revision` increments once per engine message processed, including those
/// that end up changing nothing (e.g. a discarded stale response).
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    pub doctors: SelectState,
    pub times: SelectState,
    pub revision: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_id_decodes_from_number_and_string() {
        let numeric: DoctorId = serde_json::from_str("7").unwrap();
        let text: DoctorId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(numeric, text);
        assert_eq!(numeric.as_str(), "7");
    }

    #[test]
    fn doctor_record_tolerates_minimal_payload() {
        let record: DoctorRecord =
            serde_json::from_str(r#"{"id": 7, "name": "Dr. Ivanova"}"#).unwrap();
        assert_eq!(record.id, DoctorId::from(7));
        assert_eq!(record.name, "Dr. Ivanova");
        assert!(record.photo_url.is_none());
        assert!(record.specialty.is_none());
    }

    #[test]
    fn doctor_record_accepts_directory_extras() {
        let record: DoctorRecord = serde_json::from_str(
            r#"{"id": "9", "name": "Dr. Petrov", "photo_url": "http://x/p.jpg", "specialty": "Cardiology"}"#,
        )
        .unwrap();
        assert_eq!(record.id.as_str(), "9");
        assert_eq!(record.specialty.as_deref(), Some("Cardiology"));
    }

    #[test]
    fn placeholder_renders_single_non_selectable_option() {
        let control = SelectControl::new(Placeholder::ChooseSpecialty);
        let options = control.options();
        assert_eq!(options.len(), 1);
        assert!(!options[0].selectable);
        assert!(options[0].value.is_empty());
        assert_eq!(options[0].label, Placeholder::ChooseSpecialty.label());
    }

    #[test]
    fn error_placeholder_is_distinct_from_empty_result() {
        assert_ne!(Placeholder::NoDoctors, Placeholder::DoctorsUnavailable);
        assert_ne!(
            Placeholder::NoDoctors.label(),
            Placeholder::DoctorsUnavailable.label()
        );
    }

    #[test]
    fn selectable_lookup_checks_values() {
        let mut control = SelectControl::new(Placeholder::ChooseSpecialty);
        assert!(!control.is_selectable("7"));

        control.show_items(vec![
            SelectOption::item("7", "Dr. Ivanova"),
            SelectOption::item("9", "Dr. Petrov"),
        ]);
        assert!(control.is_selectable("7"));
        assert!(control.is_selectable("9"));
        assert!(!control.is_selectable("8"));
    }
}
