//! Per-field validation rules
//!
//! Rules are plain, serializable data so that field schemas can be declared in
//! JSON or TOML. Every rule except [`Rule::Required`] accepts empty values;
//! emptiness is the business of `Required` alone.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// A single validation rule applied to one field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
	/// Value must be present (non-blank string, non-empty list, checked box)
	Required {
		#[serde(default)]
		message: Option<String>,
	},
	/// Value must look like an email address
	Email {
		#[serde(default)]
		message: Option<String>,
	},
	/// String (in characters) or list must have at least `min` entries
	MinLength {
		min: usize,
		#[serde(default)]
		message: Option<String>,
	},
	/// String (in characters) or list must have at most `max` entries
	MaxLength {
		max: usize,
		#[serde(default)]
		message: Option<String>,
	},
	/// String must match the regular expression
	Pattern {
		pattern: String,
		#[serde(default)]
		message: Option<String>,
	},
	/// Value must be numeric; numeric strings are coerced to numbers
	Number {
		#[serde(default)]
		message: Option<String>,
	},
	/// Numeric value must be at least `min`
	MinValue {
		min: f64,
		#[serde(default)]
		message: Option<String>,
	},
	/// Numeric value must be at most `max`
	MaxValue {
		max: f64,
		#[serde(default)]
		message: Option<String>,
	},
	/// Value must equal one of `values`
	OneOf {
		values: Vec<Value>,
		#[serde(default)]
		message: Option<String>,
	},
}

impl Rule {
	pub fn required() -> Self {
		Rule::Required { message: None }
	}

	pub fn email() -> Self {
		Rule::Email { message: None }
	}

	pub fn min_length(min: usize) -> Self {
		Rule::MinLength { min, message: None }
	}

	pub fn max_length(max: usize) -> Self {
		Rule::MaxLength { max, message: None }
	}

	pub fn pattern(pattern: impl Into<String>) -> Self {
		Rule::Pattern {
			pattern: pattern.into(),
			message: None,
		}
	}

	pub fn number() -> Self {
		Rule::Number { message: None }
	}

	pub fn min_value(min: f64) -> Self {
		Rule::MinValue { min, message: None }
	}

	pub fn max_value(max: f64) -> Self {
		Rule::MaxValue { max, message: None }
	}

	pub fn one_of(values: impl IntoIterator<Item = Value>) -> Self {
		Rule::OneOf {
			values: values.into_iter().collect(),
			message: None,
		}
	}

	/// Replaces the message reported when this rule fails.
	///
	/// # Examples
	///
	/// ```
	/// use concierge_forms::Rule;
	/// use serde_json::json;
	///
	/// let rule = Rule::email().with_message("Invalid email");
	/// assert_eq!(rule.check(&json!("nope")), Err("Invalid email".to_string()));
	/// ```
	pub fn with_message(mut self, text: impl Into<String>) -> Self {
		let slot = match &mut self {
			Rule::Required { message }
			| Rule::Email { message }
			| Rule::MinLength { message, .. }
			| Rule::MaxLength { message, .. }
			| Rule::Pattern { message, .. }
			| Rule::Number { message }
			| Rule::MinValue { message, .. }
			| Rule::MaxValue { message, .. }
			| Rule::OneOf { message, .. } => message,
		};
		*slot = Some(text.into());
		self
	}

	fn message(&self) -> Option<&str> {
		match self {
			Rule::Required { message }
			| Rule::Email { message }
			| Rule::MinLength { message, .. }
			| Rule::MaxLength { message, .. }
			| Rule::Pattern { message, .. }
			| Rule::Number { message }
			| Rule::MinValue { message, .. }
			| Rule::MaxValue { message, .. }
			| Rule::OneOf { message, .. } => message.as_deref(),
		}
	}

	fn default_message(&self) -> String {
		match self {
			Rule::Required { .. } => "This field is required.".to_string(),
			Rule::Email { .. } => "Enter a valid email address.".to_string(),
			Rule::MinLength { min, .. } => {
				format!("Ensure this value has at least {} characters.", min)
			}
			Rule::MaxLength { max, .. } => {
				format!("Ensure this value has at most {} characters.", max)
			}
			Rule::Pattern { .. } => "Enter a valid value.".to_string(),
			Rule::Number { .. } => "Enter a number.".to_string(),
			Rule::MinValue { min, .. } => {
				format!("Ensure this value is greater than or equal to {}.", min)
			}
			Rule::MaxValue { max, .. } => {
				format!("Ensure this value is less than or equal to {}.", max)
			}
			Rule::OneOf { .. } => "Select a valid choice.".to_string(),
		}
	}

	fn fail(&self) -> String {
		self.message()
			.map(str::to_string)
			.unwrap_or_else(|| self.default_message())
	}

	/// Checks one value against this rule.
	pub fn check(&self, value: &Value) -> Result<(), String> {
		if let Rule::Required { .. } = self {
			return if is_empty(value) { Err(self.fail()) } else { Ok(()) };
		}
		if is_empty(value) {
			return Ok(());
		}

		let passed = match self {
			Rule::Required { .. } => true,
			Rule::Email { .. } => value.as_str().is_some_and(|s| EMAIL_REGEX.is_match(s)),
			Rule::MinLength { min, .. } => length_of(value).is_some_and(|len| len >= *min),
			Rule::MaxLength { max, .. } => length_of(value).is_some_and(|len| len <= *max),
			Rule::Pattern { pattern, .. } => match Regex::new(pattern) {
				Ok(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
				Err(e) => {
					tracing::warn!(pattern = %pattern, error = %e, "invalid pattern rule");
					false
				}
			},
			Rule::Number { .. } => as_number(value).is_some(),
			Rule::MinValue { min, .. } => as_number(value).is_some_and(|n| n >= *min),
			Rule::MaxValue { max, .. } => as_number(value).is_some_and(|n| n <= *max),
			Rule::OneOf { values, .. } => values.contains(value),
		};

		if passed { Ok(()) } else { Err(self.fail()) }
	}

	/// Converts a passing value into its validated form.
	///
	/// Only [`Rule::Number`] coerces: numeric strings become JSON numbers.
	pub fn coerce(&self, value: Value) -> Value {
		match (self, &value) {
			(Rule::Number { .. }, Value::String(raw)) => parse_number(raw).unwrap_or(value),
			_ => value,
		}
	}
}

/// Runs `rules` in order, returning the coerced value or the first failure.
pub fn apply_rules<'a>(
	rules: impl IntoIterator<Item = &'a Rule>,
	value: &Value,
) -> Result<Value, String> {
	let mut current = value.clone();
	for rule in rules {
		rule.check(&current)?;
		current = rule.coerce(current);
	}
	Ok(current)
}

/// Emptiness as seen by [`Rule::Required`].
pub fn is_empty(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.trim().is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Bool(checked) => !checked,
		Value::Number(_) => false,
	}
}

fn length_of(value: &Value) -> Option<usize> {
	match value {
		Value::String(s) => Some(s.chars().count()),
		Value::Array(items) => Some(items.len()),
		_ => None,
	}
}

fn as_number(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
		_ => None,
	}
}

fn parse_number(raw: &str) -> Option<Value> {
	let trimmed = raw.trim();
	if let Ok(int) = trimmed.parse::<i64>() {
		return Some(Value::Number(int.into()));
	}
	trimmed
		.parse::<f64>()
		.ok()
		.and_then(Number::from_f64)
		.map(Value::Number)
}
