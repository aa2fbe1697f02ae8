//! Form configuration
//!
//! [`FormConfig`] fixes the behaviour of one form instance (when validation
//! runs, what the submit button says). [`FormDefinition`] bundles a config with
//! its fields and default values so a whole form can be declared in JSON or
//! TOML.
//!
//! ```toml
//! [config]
//! mode = "onTouched"
//!
//! [[fields]]
//! name = "email"
//! kind = "email"
//! required = true
//! rules = [{ type = "email", message = "Invalid email" }]
//! ```

use crate::error::FormResult;
use crate::schema::FieldSchema;
use crate::validation::FormValues;
use serde::{Deserialize, Serialize};

/// When field edits trigger validation. Fixed per form instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
	/// Only when the form is submitted
	#[default]
	OnSubmit,
	/// On every change
	OnChange,
	/// When a field loses focus
	OnBlur,
	/// On first blur, then on every change of that field
	OnTouched,
	/// On change and on blur
	All,
}

impl ValidationMode {
	/// Whether a change validates, given whether the field was blurred before.
	pub fn validates_on_change(self, blurred: bool) -> bool {
		match self {
			ValidationMode::OnChange | ValidationMode::All => true,
			ValidationMode::OnTouched => blurred,
			ValidationMode::OnSubmit | ValidationMode::OnBlur => false,
		}
	}

	pub fn validates_on_blur(self) -> bool {
		matches!(
			self,
			ValidationMode::OnBlur | ValidationMode::OnTouched | ValidationMode::All
		)
	}
}

/// Extra revalidation trigger once a submit attempt has happened.
///
/// Adds to the triggers of the form's [`ValidationMode`], never removes any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevalidateMode {
	OnChange,
	OnBlur,
	OnSubmit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
	pub mode: ValidationMode,
	/// Unset keeps the mode's own triggers after a submit
	pub revalidate: Option<RevalidateMode>,
	pub submit_label: String,
	/// Label shown on the submit button while a submission is in flight
	pub busy_label: String,
}

impl Default for FormConfig {
	fn default() -> Self {
		Self {
			mode: ValidationMode::default(),
			revalidate: None,
			submit_label: "Save".to_string(),
			busy_label: "Saving...".to_string(),
		}
	}
}

impl FormConfig {
	pub fn with_mode(mut self, mode: ValidationMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_revalidate(mut self, revalidate: RevalidateMode) -> Self {
		self.revalidate = Some(revalidate);
		self
	}

	pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
		self.submit_label = label.into();
		self
	}

	pub fn from_json(raw: &str) -> FormResult<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	pub fn from_toml(raw: &str) -> FormResult<Self> {
		Ok(toml::from_str(raw)?)
	}
}

/// A whole form declared as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
	#[serde(default)]
	pub config: FormConfig,
	pub fields: Vec<FieldSchema>,
	#[serde(default)]
	pub default_values: FormValues,
}

impl FormDefinition {
	pub fn from_json(raw: &str) -> FormResult<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	pub fn from_toml(raw: &str) -> FormResult<Self> {
		Ok(toml::from_str(raw)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::FormError;
	use crate::path::FieldPath;
	use crate::rules::Rule;
	use crate::schema::FieldKind;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(ValidationMode::OnSubmit, false, false, false)]
	#[case(ValidationMode::OnChange, true, true, false)]
	#[case(ValidationMode::OnBlur, false, false, true)]
	#[case(ValidationMode::OnTouched, false, true, true)]
	#[case(ValidationMode::All, true, true, true)]
	fn test_mode_triggers(
		#[case] mode: ValidationMode,
		#[case] change_fresh: bool,
		#[case] change_blurred: bool,
		#[case] blur: bool,
	) {
		assert_eq!(mode.validates_on_change(false), change_fresh);
		assert_eq!(mode.validates_on_change(true), change_blurred);
		assert_eq!(mode.validates_on_blur(), blur);
	}

	#[rstest]
	fn test_config_defaults_fill_missing_keys() {
		let config = FormConfig::from_json(r#"{"mode": "onTouched"}"#).unwrap();
		assert_eq!(config.mode, ValidationMode::OnTouched);
		assert_eq!(config.revalidate, None);
		assert_eq!(config.submit_label, "Save");
	}

	#[rstest]
	fn test_config_rejects_unknown_mode() {
		let err = FormConfig::from_json(r#"{"mode": "sometimes"}"#).unwrap_err();
		assert!(matches!(err, FormError::Config(_)));
	}

	#[rstest]
	fn test_definition_from_toml() {
		let definition = FormDefinition::from_toml(
			r#"
			[config]
			mode = "all"
			submit_label = "Update assistant"

			[default_values]
			"assistant.name" = "Ava"

			[[fields]]
			name = "assistant.name"
			kind = "text"
			required = true

			[[fields]]
			name = "assistant.email"
			kind = "email"
			rules = [{ type = "email", message = "Invalid email" }]
			"#,
		)
		.unwrap();

		assert_eq!(definition.config.mode, ValidationMode::All);
		assert_eq!(definition.config.submit_label, "Update assistant");
		assert_eq!(definition.fields.len(), 2);
		assert_eq!(definition.fields[1].kind, FieldKind::Email);
		assert_eq!(
			definition.fields[1].rules,
			vec![Rule::email().with_message("Invalid email")]
		);
		assert_eq!(
			definition.default_values.get(&FieldPath::parse("assistant.name")),
			Some(&json!("Ava"))
		);
	}

	#[rstest]
	fn test_definition_from_json() {
		let definition = FormDefinition::from_json(
			r#"{"fields": [{"name": "tone", "kind": "select", "options": [{"label": "Formal", "value": "formal"}]}]}"#,
		)
		.unwrap();
		assert_eq!(definition.config, FormConfig::default());
		assert_eq!(definition.fields[0].options[0].value, json!("formal"));
	}
}
