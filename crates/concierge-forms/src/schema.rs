//! Field schemas
//!
//! A [`FieldSchema`] declares one input: where its value lives, how it is
//! presented and which rules it must satisfy. Schemas are plain data; they are
//! built by the caller before the form mounts and may be replaced wholesale
//! between renders (the engine reconciles them by path).

use crate::path::FieldPath;
use crate::rules::{Rule, apply_rules};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presentation kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	Text,
	Email,
	Password,
	Number,
	Tel,
	Date,
	Select,
	Textarea,
	Checkbox,
	Radio,
	/// Rendered by a registered custom widget
	Custom,
}

impl FieldKind {
	/// HTML `type` attribute for single-line inputs.
	pub fn input_type(self) -> Option<&'static str> {
		match self {
			FieldKind::Text => Some("text"),
			FieldKind::Email => Some("email"),
			FieldKind::Password => Some("password"),
			FieldKind::Number => Some("number"),
			FieldKind::Tel => Some("tel"),
			FieldKind::Date => Some("date"),
			_ => None,
		}
	}

	pub fn has_options(self) -> bool {
		matches!(self, FieldKind::Select | FieldKind::Radio)
	}
}

/// One entry of a select or radio field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
	pub label: String,
	pub value: Value,
}

impl FieldOption {
	pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
		Self {
			label: label.into(),
			value: value.into(),
		}
	}
}

/// Declarative description of one form input.
///
/// # Examples
///
/// ```
/// use concierge_forms::{FieldKind, FieldSchema, Rule};
/// use serde_json::json;
///
/// let field = FieldSchema::email("email")
///     .with_label("Email")
///     .required()
///     .with_rule(Rule::email().with_message("Invalid email"));
///
/// assert_eq!(field.kind, FieldKind::Email);
/// assert_eq!(field.empty_value(), json!(""));
/// assert_eq!(field.check(&json!("a")), Err("Invalid email".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
	/// Unique path of the field within its form
	#[serde(rename = "name")]
	pub path: FieldPath,
	pub kind: FieldKind,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub placeholder: Option<String>,
	#[serde(default)]
	pub help_text: Option<String>,
	#[serde(default)]
	pub options: Vec<FieldOption>,
	#[serde(default)]
	pub disabled: bool,
	#[serde(default)]
	pub required: bool,
	/// Select and custom fields holding a list of values
	#[serde(default)]
	pub multiple: bool,
	#[serde(default)]
	pub default_value: Option<Value>,
	#[serde(default)]
	pub rules: Vec<Rule>,
	/// Registered widget id for [`FieldKind::Custom`]
	#[serde(default)]
	pub widget: Option<String>,
	/// Fields sharing a group are rendered together
	#[serde(default)]
	pub group: Option<String>,
}

impl FieldSchema {
	pub fn new(path: impl Into<FieldPath>, kind: FieldKind) -> Self {
		Self {
			path: path.into(),
			kind,
			label: None,
			placeholder: None,
			help_text: None,
			options: Vec::new(),
			disabled: false,
			required: false,
			multiple: false,
			default_value: None,
			rules: Vec::new(),
			widget: None,
			group: None,
		}
	}

	pub fn text(path: impl Into<FieldPath>) -> Self {
		Self::new(path, FieldKind::Text)
	}

	pub fn email(path: impl Into<FieldPath>) -> Self {
		Self::new(path, FieldKind::Email)
	}

	pub fn password(path: impl Into<FieldPath>) -> Self {
		Self::new(path, FieldKind::Password)
	}

	pub fn number(path: impl Into<FieldPath>) -> Self {
		Self::new(path, FieldKind::Number)
	}

	pub fn textarea(path: impl Into<FieldPath>) -> Self {
		Self::new(path, FieldKind::Textarea)
	}

	pub fn checkbox(path: impl Into<FieldPath>) -> Self {
		Self::new(path, FieldKind::Checkbox)
	}

	pub fn select(
		path: impl Into<FieldPath>,
		options: impl IntoIterator<Item = FieldOption>,
	) -> Self {
		Self::new(path, FieldKind::Select).with_options(options)
	}

	pub fn radio(
		path: impl Into<FieldPath>,
		options: impl IntoIterator<Item = FieldOption>,
	) -> Self {
		Self::new(path, FieldKind::Radio).with_options(options)
	}

	/// Field rendered by the custom widget registered under `widget`.
	pub fn custom(path: impl Into<FieldPath>, widget: impl Into<String>) -> Self {
		let mut field = Self::new(path, FieldKind::Custom);
		field.widget = Some(widget.into());
		field
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = Some(placeholder.into());
		self
	}

	pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
		self.help_text = Some(help_text.into());
		self
	}

	pub fn with_options(mut self, options: impl IntoIterator<Item = FieldOption>) -> Self {
		self.options = options.into_iter().collect();
		self
	}

	pub fn with_default(mut self, value: impl Into<Value>) -> Self {
		self.default_value = Some(value.into());
		self
	}

	pub fn with_rule(mut self, rule: Rule) -> Self {
		self.rules.push(rule);
		self
	}

	pub fn in_group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn multiple(mut self) -> Self {
		self.multiple = true;
		self
	}

	pub fn disabled(mut self) -> Self {
		self.disabled = true;
		self
	}

	/// Dotted name used for the HTML `name` attribute.
	pub fn name(&self) -> String {
		self.path.to_string()
	}

	/// Value a field holds when neither the form nor the schema provides one.
	pub fn empty_value(&self) -> Value {
		match self.kind {
			FieldKind::Checkbox => Value::Bool(false),
			FieldKind::Select | FieldKind::Custom if self.multiple => Value::Array(Vec::new()),
			_ => Value::String(String::new()),
		}
	}

	/// Resolves the initial value: form default, then field default, then empty.
	pub fn initial_value(&self, form_default: Option<&Value>) -> Value {
		form_default
			.or(self.default_value.as_ref())
			.cloned()
			.unwrap_or_else(|| self.empty_value())
	}

	/// Value of the option at `index`.
	pub fn option_value(&self, index: usize) -> Option<&Value> {
		self.options.get(index).map(|option| &option.value)
	}

	/// Runs `required` and the field's own rules against `value`.
	pub fn check(&self, value: &Value) -> Result<Value, String> {
		let implicit = self
			.required
			.then(Rule::required)
			.filter(|_| !self.rules.iter().any(|r| matches!(r, Rule::Required { .. })));
		apply_rules(implicit.iter().chain(self.rules.iter()), value)
	}
}
