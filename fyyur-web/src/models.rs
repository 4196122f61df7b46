use fyyur_core::forms::{FormData, ValidationError};
use fyyur_core::{Choice, Genre, US_STATES};

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Submitted (or stored) values plus any field errors, used to re-fill a form.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub data: FormData,
    pub errors: ValidationError,
}

impl FormView {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn filled(data: FormData) -> Self {
        Self {
            data,
            errors: ValidationError::default(),
        }
    }

    pub fn with_errors(data: FormData, errors: ValidationError) -> Self {
        Self { data, errors }
    }

    pub fn value(&self, field: &str) -> &str {
        self.data.value(field)
    }

    pub fn checked(&self, field: &str) -> bool {
        !self.data.value(field).trim().is_empty()
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.message_for(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn state_options(&self) -> Vec<SelectOption> {
        let current = self.value("state");
        US_STATES
            .iter()
            .map(|code| SelectOption {
                value: code.to_string(),
                label: code.to_string(),
                selected: current.eq_ignore_ascii_case(code),
            })
            .collect()
    }

    pub fn genre_options(&self) -> Vec<SelectOption> {
        let chosen = self.data.get_all("genres");
        Genre::ALL
            .iter()
            .map(|genre| SelectOption {
                value: genre.label().to_string(),
                label: genre.label().to_string(),
                selected: chosen.iter().any(|c| c.eq_ignore_ascii_case(genre.label())),
            })
            .collect()
    }

    /// Options for an id select, marking the submitted id as selected.
    pub fn choice_options(&self, field: &str, choices: &[Choice]) -> Vec<SelectOption> {
        let current = self.value(field).trim();
        choices
            .iter()
            .map(|choice| {
                let value = choice.id.to_string();
                SelectOption {
                    selected: value == current,
                    label: format!("{} (#{})", choice.name, choice.id),
                    value,
                }
            })
            .collect()
    }
}
