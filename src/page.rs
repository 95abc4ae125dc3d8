//! Page model: select controls, dropdown enhancement and change events
//!
//! The page owns its controls. The user is the only writer of a control's
//! value; everything else reads it through the [`ChangeEvent`] a selection
//! produces.

use tracing::debug;

use crate::constants::page::{CONFIG_SELECT_ID, CONFIG_SELECT_LABEL};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PageError {
    #[error("duplicate select control id '{0}'")]
    DuplicateControl(String),
    #[error("page has no 'configSelect' control")]
    MissingConfigSelect,
    #[error("unknown select control '{0}'")]
    UnknownControl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// Option whose label is its value
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectControl {
    pub id: String,
    pub label: String,
    pub options: Vec<SelectOption>,
    value: Option<String>,
    enhanced: bool,
}

impl SelectControl {
    pub fn new(id: impl Into<String>, label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            options,
            value: None,
            enhanced: false,
        }
    }

    /// The configuration dropdown, one option per identifier
    pub fn config_select<I, S>(config_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            CONFIG_SELECT_ID,
            CONFIG_SELECT_LABEL,
            config_ids.into_iter().map(SelectOption::plain).collect(),
        )
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_enhanced(&self) -> bool {
        self.enhanced
    }

    /// Label of the current value, falling back to the raw value
    pub fn selected_label(&self) -> &str {
        let Some(value) = self.value.as_deref() else {
            return "";
        };
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
            .unwrap_or(value)
    }
}

/// User-driven change of a control's value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub control_id: String,
    pub value: String,
}

/// Applies the platform dropdown behavior to one control
pub trait DropdownEnhancer {
    fn enhance(&mut self, control: &SelectControl);
}

/// Enhancer that only records the enhancement in the debug log
#[derive(Debug, Default)]
pub struct LoggingEnhancer;

impl DropdownEnhancer for LoggingEnhancer {
    fn enhance(&mut self, control: &SelectControl) {
        debug!(
            control = %control.id,
            options = control.options.len(),
            "Enhanced select control"
        );
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    controls: Vec<SelectControl>,
}

impl Page {
    pub fn new(controls: Vec<SelectControl>) -> Result<Self, PageError> {
        for (idx, control) in controls.iter().enumerate() {
            if controls[..idx].iter().any(|other| other.id == control.id) {
                return Err(PageError::DuplicateControl(control.id.clone()));
            }
        }

        if !controls.iter().any(|control| control.id == CONFIG_SELECT_ID) {
            return Err(PageError::MissingConfigSelect);
        }

        Ok(Self { controls })
    }

    /// Enhance every control not enhanced yet. Returns how many were enhanced.
    pub fn on_ready(&mut self, enhancer: &mut dyn DropdownEnhancer) -> usize {
        let mut count = 0;
        for control in self.controls.iter_mut().filter(|c| !c.enhanced) {
            enhancer.enhance(control);
            control.enhanced = true;
            count += 1;
        }
        count
    }

    pub fn controls(&self) -> &[SelectControl] {
        &self.controls
    }

    #[cfg(test)]
    pub fn control(&self, id: &str) -> Option<&SelectControl> {
        self.controls.iter().find(|control| control.id == id)
    }

    /// Apply a user selection.
    ///
    /// Returns the change event, or `None` when the value did not change.
    /// Values outside the option list are accepted as-is.
    pub fn select(&mut self, control_id: &str, value: &str) -> Result<Option<ChangeEvent>, PageError> {
        let control = self
            .controls
            .iter_mut()
            .find(|control| control.id == control_id)
            .ok_or_else(|| PageError::UnknownControl(control_id.to_string()))?;

        if control.value.as_deref() == Some(value) {
            return Ok(None);
        }

        control.value = Some(value.to_string());
        Ok(Some(ChangeEvent {
            control_id: control.id.clone(),
            value: value.to_string(),
        }))
    }
}
