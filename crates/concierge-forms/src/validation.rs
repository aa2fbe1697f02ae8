//! Validation schemas
//!
//! The engine never decides on its own whether a whole form is acceptable; it
//! hands the current values to a caller-supplied [`ValidationSchema`] and
//! records what comes back. Failure is data, not an error: a schema returns
//! [`Validation::Invalid`] with one message per offending field.
//!
//! [`RuleSchema`] is the stock implementation: per-field [`Rule`] lists plus
//! cross-field checks (password confirmation and the like).

use crate::error::{FormError, FormResult};
use crate::path::{FieldPath, PathSegment};
use crate::rules::{Rule, apply_rules};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Current values of a form, keyed by field path.
pub type FormValues = BTreeMap<FieldPath, Value>;

/// One message per offending field.
pub type FieldErrors = BTreeMap<FieldPath, String>;

/// Outcome of running a schema over a value map.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
	Valid(FormData),
	Invalid(FieldErrors),
}

impl Validation {
	pub fn is_valid(&self) -> bool {
		matches!(self, Validation::Valid(_))
	}

	pub fn errors(&self) -> Option<&FieldErrors> {
		match self {
			Validation::Valid(_) => None,
			Validation::Invalid(errors) => Some(errors),
		}
	}
}

/// Validated (and coerced) form values handed to the submit handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
	values: FormValues,
}

impl FormData {
	pub fn new(values: FormValues) -> Self {
		Self { values }
	}

	pub fn get(&self, path: impl Into<FieldPath>) -> Option<&Value> {
		self.values.get(&path.into())
	}

	pub fn values(&self) -> &FormValues {
		&self.values
	}

	pub fn into_values(self) -> FormValues {
		self.values
	}

	/// Nests the flat path map into a JSON document.
	///
	/// Fails with [`FormError::IndexOutOfRange`] for a path indexing past
	/// [`MAX_LIST_INDEX`](crate::MAX_LIST_INDEX).
	///
	/// # Examples
	///
	/// ```
	/// use concierge_forms::{FieldPath, FormData, FormValues};
	/// use serde_json::json;
	///
	/// let mut values = FormValues::new();
	/// values.insert(FieldPath::item("faq", 1, "question"), json!("Refunds?"));
	/// values.insert(FieldPath::new("name"), json!("Ada"));
	///
	/// let doc = FormData::new(values).to_json().unwrap();
	/// assert_eq!(doc, json!({"faq": [null, {"question": "Refunds?"}], "name": "Ada"}));
	/// ```
	pub fn to_json(&self) -> FormResult<Value> {
		let mut root = Value::Object(Map::new());
		for (path, value) in &self.values {
			if path.exceeds_list_limit() {
				return Err(FormError::IndexOutOfRange(path.clone()));
			}
			insert_at(&mut root, path.segments(), value.clone());
		}
		Ok(root)
	}
}

fn insert_at(target: &mut Value, segments: &[PathSegment], value: Value) {
	let Some((head, rest)) = segments.split_first() else {
		*target = value;
		return;
	};
	match head {
		PathSegment::Key(key) => {
			if !target.is_object() {
				*target = Value::Object(Map::new());
			}
			if let Value::Object(map) = target {
				let slot = map.entry(key.clone()).or_insert(Value::Null);
				insert_at(slot, rest, value);
			}
		}
		PathSegment::Index(index) => {
			if !target.is_array() {
				*target = Value::Array(Vec::new());
			}
			if let Value::Array(items) = target {
				if items.len() <= *index {
					items.resize(index.saturating_add(1), Value::Null);
				}
				if let Some(slot) = items.get_mut(*index) {
					insert_at(slot, rest, value);
				}
			}
		}
	}
}

/// Structural validator for a whole form's value map.
pub trait ValidationSchema {
	fn validate(&self, values: &FormValues) -> Validation;
}

impl<F> ValidationSchema for F
where
	F: Fn(&FormValues) -> Validation,
{
	fn validate(&self, values: &FormValues) -> Validation {
		self(values)
	}
}

type CheckFn = Box<dyn Fn(&FormValues) -> Result<(), String>>;

struct CrossCheck {
	target: FieldPath,
	check: CheckFn,
}

/// Rule-based [`ValidationSchema`].
///
/// # Examples
///
/// ```
/// use concierge_forms::{FieldPath, FormValues, Rule, RuleSchema, Validation, ValidationSchema};
/// use serde_json::json;
///
/// let schema = RuleSchema::new()
///     .field("name", [Rule::required().with_message("required")])
///     .field("age", [Rule::required(), Rule::number()]);
///
/// let mut values = FormValues::new();
/// values.insert(FieldPath::new("name"), json!(""));
/// values.insert(FieldPath::new("age"), json!("5"));
///
/// let Validation::Invalid(errors) = schema.validate(&values) else { panic!() };
/// assert_eq!(errors.get(&FieldPath::new("name")).map(String::as_str), Some("required"));
/// assert!(!errors.contains_key(&FieldPath::new("age")));
/// ```
#[derive(Default)]
pub struct RuleSchema {
	rules: BTreeMap<FieldPath, Vec<Rule>>,
	checks: Vec<CrossCheck>,
}

impl RuleSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends rules for one field.
	pub fn field(
		mut self,
		path: impl Into<FieldPath>,
		rules: impl IntoIterator<Item = Rule>,
	) -> Self {
		self.rules.entry(path.into()).or_default().extend(rules);
		self
	}

	/// Adds a cross-field check whose failure is reported on `target`.
	///
	/// Checks run after the per-field rules and only when `target` passed them.
	pub fn check<F>(mut self, target: impl Into<FieldPath>, check: F) -> Self
	where
		F: Fn(&FormValues) -> Result<(), String> + 'static,
	{
		self.checks.push(CrossCheck {
			target: target.into(),
			check: Box::new(check),
		});
		self
	}

	/// Requires two fields to hold equal values; reports on `confirm`.
	pub fn fields_equal(
		self,
		original: impl Into<FieldPath>,
		confirm: impl Into<FieldPath>,
		message: impl Into<String>,
	) -> Self {
		let original = original.into();
		let confirm = confirm.into();
		let message = message.into();
		let target = confirm.clone();
		self.check(target, move |values| {
			if values.get(&original) == values.get(&confirm) {
				Ok(())
			} else {
				Err(message.clone())
			}
		})
	}

	pub fn rules_for(&self, path: &FieldPath) -> &[Rule] {
		self.rules.get(path).map(Vec::as_slice).unwrap_or(&[])
	}
}

impl ValidationSchema for RuleSchema {
	fn validate(&self, values: &FormValues) -> Validation {
		let mut cleaned = values.clone();
		let mut errors = FieldErrors::new();

		for (path, rules) in &self.rules {
			let value = values.get(path).cloned().unwrap_or(Value::Null);
			match apply_rules(rules, &value) {
				Ok(coerced) => {
					cleaned.insert(path.clone(), coerced);
				}
				Err(message) => {
					errors.insert(path.clone(), message);
				}
			}
		}

		for check in &self.checks {
			if errors.contains_key(&check.target) {
				continue;
			}
			if let Err(message) = (check.check)(&cleaned) {
				errors.insert(check.target.clone(), message);
			}
		}

		if errors.is_empty() {
			Validation::Valid(FormData::new(cleaned))
		} else {
			Validation::Invalid(errors)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn values(pairs: &[(&str, Value)]) -> FormValues {
		pairs
			.iter()
			.map(|(path, value)| (FieldPath::parse(path), value.clone()))
			.collect()
	}

	#[rstest]
	fn test_empty_schema_accepts_everything() {
		let input = values(&[("anything", json!(1))]);
		assert_eq!(
			RuleSchema::new().validate(&input),
			Validation::Valid(FormData::new(input.clone()))
		);
	}

	#[rstest]
	fn test_missing_value_is_null() {
		let schema = RuleSchema::new().field("name", [Rule::required()]);
		let result = schema.validate(&FormValues::new());
		assert!(result.errors().unwrap().contains_key(&FieldPath::new("name")));
	}

	#[rstest]
	fn test_valid_data_is_coerced() {
		let schema = RuleSchema::new().field("age", [Rule::number()]);
		let Validation::Valid(data) = schema.validate(&values(&[("age", json!("30"))])) else {
			panic!("expected valid");
		};
		assert_eq!(data.get("age"), Some(&json!(30)));
	}

	#[rstest]
	fn test_fields_equal_reports_on_confirm() {
		let schema =
			RuleSchema::new().fields_equal("password", "confirm", "Passwords do not match");
		let result = schema.validate(&values(&[("password", json!("a")), ("confirm", json!("b"))]));
		assert_eq!(
			result.errors().unwrap().get(&FieldPath::new("confirm")),
			Some(&"Passwords do not match".to_string())
		);
	}

	#[rstest]
	fn test_cross_check_skipped_when_target_already_failed() {
		let schema = RuleSchema::new()
			.field("confirm", [Rule::required().with_message("required")])
			.fields_equal("password", "confirm", "mismatch");
		let result = schema.validate(&values(&[("password", json!("a")), ("confirm", json!(""))]));
		assert_eq!(
			result.errors().unwrap().get(&FieldPath::new("confirm")),
			Some(&"required".to_string())
		);
	}

	#[rstest]
	fn test_closure_schema() {
		let schema = |values: &FormValues| {
			if values.contains_key(&FieldPath::new("ok")) {
				Validation::Valid(FormData::new(values.clone()))
			} else {
				Validation::Invalid(FieldErrors::new())
			}
		};
		assert!(schema.validate(&values(&[("ok", json!(true))])).is_valid());
		assert!(!schema.validate(&FormValues::new()).is_valid());
	}

	#[rstest]
	fn test_to_json_nests_lists() {
		let data = FormData::new(values(&[
			("channels.0.kind", json!("email")),
			("channels.1.kind", json!("chat")),
			("assistant.name", json!("Ava")),
		]));
		assert_eq!(
			data.to_json().unwrap(),
			json!({
				"assistant": {"name": "Ava"},
				"channels": [{"kind": "email"}, {"kind": "chat"}]
			})
		);
	}

	#[rstest]
	#[case("faq.18446744073709551615.question")]
	#[case("faq.4000000000.question")]
	#[case("faq.10000")]
	fn test_to_json_rejects_oversized_index(#[case] path: &str) {
		let data = FormData::new(values(&[(path, json!("x"))]));
		let err = data.to_json().unwrap_err();
		assert!(matches!(err, FormError::IndexOutOfRange(p) if p == FieldPath::parse(path)));
	}

	#[rstest]
	fn test_to_json_accepts_last_allowed_index() {
		let data = FormData::new(values(&[("faq.9999", json!("x"))]));
		let doc = data.to_json().unwrap();
		assert_eq!(doc["faq"].as_array().map(Vec::len), Some(10_000));
		assert_eq!(doc["faq"][9999], json!("x"));
	}
}
