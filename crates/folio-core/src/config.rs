#![forbid(unsafe_code)]

//! Configuration for the drag layer.
//!
//! [`DragConfig`] can be handed over from the page as JSON; every field has a
//! default, so `{}` and `DragConfig::default()` describe the same setup.
//!
//! ```json
//! {
//!   "storage_key": "elementPositions",
//!   "coarse_step": 10,
//!   "groups": [{ "name": "skill-card", "selector": ".skill-card" }]
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Default durable-store key holding the saved layout.
pub const DEFAULT_STORAGE_KEY: &str = "elementPositions";
/// Attribute carrying an enrolled element's identity.
pub const DEFAULT_IDENTITY_ATTRIBUTE: &str = "data-drag-id";

/// One group of elements eligible for dragging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragGroup {
    /// Stable name, used as the prefix of generated identities.
    pub name: String,
    /// CSS selector matching the group's elements.
    pub selector: String,
}

impl DragGroup {
    #[must_use]
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
        }
    }
}

/// Visual affordances applied while resting and while lifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub idle_cursor: String,
    pub active_cursor: String,
    pub resting_z_index: i32,
    pub lifted_z_index: i32,
    pub lifted_shadow: String,
    pub lifted_transform: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            idle_cursor: "grab".to_owned(),
            active_cursor: "grabbing".to_owned(),
            resting_z_index: 10,
            lifted_z_index: 1000,
            lifted_shadow: "0 10px 30px rgba(59, 130, 246, 0.3)".to_owned(),
            lifted_transform: "scale(1.05)".to_owned(),
        }
    }
}

/// Top-level drag layer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Durable-store key for the saved layout.
    pub storage_key: String,
    /// Attribute the identity is written to at enrollment.
    pub identity_attribute: String,
    /// Enrollment groups, in enrollment order.
    pub groups: Vec<DragGroup>,
    /// Keyboard nudge step without shift, in pixels.
    pub fine_step: f64,
    /// Keyboard nudge step with shift held, in pixels.
    pub coarse_step: f64,
    pub appearance: Appearance,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            identity_attribute: DEFAULT_IDENTITY_ATTRIBUTE.to_owned(),
            groups: vec![
                DragGroup::new("profile-image", ".profile-image-wrapper"),
                DragGroup::new("skill-card", ".skill-card"),
                DragGroup::new("project-card", ".project-card"),
                DragGroup::new("contact-method", ".contact-method"),
            ],
            fine_step: 1.0,
            coarse_step: 10.0,
            appearance: Appearance::default(),
        }
    }
}

impl DragConfig {
    /// Parse from JSON without validating.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Parse from JSON and reject configurations that fail [`Self::validate`].
    pub fn from_json_validated(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_json_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Selector matching any enrolled group, for `Element.closest()`.
    #[must_use]
    pub fn combined_selector(&self) -> String {
        self.groups
            .iter()
            .map(|group| group.selector.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; empty means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.storage_key.is_empty() {
            errors.push("storage_key must not be empty".into());
        }
        if self.identity_attribute.is_empty() {
            errors.push("identity_attribute must not be empty".into());
        }
        if !(self.fine_step.is_finite() && self.fine_step > 0.0) {
            errors.push(format!("fine_step must be > 0, got {}", self.fine_step));
        }
        if !(self.coarse_step.is_finite() && self.coarse_step > 0.0) {
            errors.push(format!(
                "coarse_step must be > 0, got {}",
                self.coarse_step
            ));
        }

        let mut seen = HashSet::new();
        for (index, group) in self.groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                errors.push(format!("groups[{index}].name must not be empty"));
            } else if !seen.insert(group.name.as_str()) {
                errors.push(format!("groups[{index}].name {:?} is duplicated", group.name));
            }
            if group.selector.trim().is_empty() {
                errors.push(format!("groups[{index}].selector must not be empty"));
            }
        }

        errors
    }
}

/// Errors from loading a [`DragConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
