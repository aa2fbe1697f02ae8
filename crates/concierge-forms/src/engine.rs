//! Form engine
//!
//! [`FormEngine`] owns one form's [`FormState`] and is the only place it is
//! mutated. It is synchronous and knows nothing about rendering; the async
//! submit lifecycle lives on [`FormHandle`](crate::FormHandle), which drives
//! [`FormEngine::begin_submit`] and [`FormEngine::finish_submit`].
//!
//! ## Validation triggers
//!
//! | Event | Validates when |
//! |-------|----------------|
//! | change | mode is `onChange`/`all`, or `onTouched` and the field was blurred |
//! | blur | mode is `onBlur`/`onTouched`/`all` |
//! | after a submit attempt | additionally on the `revalidate` trigger, if set |
//! | submit | always, over every field |

use crate::changes::FieldChange;
use crate::config::{FormConfig, RevalidateMode};
use crate::error::{FormError, FormResult};
use crate::path::FieldPath;
use crate::schema::{FieldKind, FieldSchema};
use crate::state::FormState;
use crate::validation::{FieldErrors, FormData, FormValues, Validation, ValidationSchema};
use serde_json::Value;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::{debug, warn};

/// How a value update is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeOptions {
	/// Run validation if the trigger mode allows it
	pub validate: bool,
	pub mark_dirty: bool,
	pub mark_touched: bool,
}

impl ChangeOptions {
	/// A change typed by the user: dirty, touched, validated per mode.
	pub fn user_edit() -> Self {
		Self {
			validate: true,
			mark_dirty: true,
			mark_touched: true,
		}
	}

	/// A programmatic update that leaves flags and errors alone.
	pub fn silent() -> Self {
		Self::default()
	}
}

/// First half of a submission, as decided by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStep {
	/// A submission is already in flight
	Ignored,
	/// Validation failed; `submitting` is already reset
	Invalid(FieldErrors),
	/// Validated data for the submit handler; `submitting` stays set
	Ready(FormData),
}

pub struct FormEngine {
	fields: Vec<FieldSchema>,
	schema: Rc<dyn ValidationSchema>,
	config: FormConfig,
	default_values: FormValues,
	state: FormState,
}

impl FormEngine {
	/// Builds an engine and initialises its state.
	///
	/// Fails on duplicate field paths and on custom fields without a widget id.
	pub fn new(
		fields: Vec<FieldSchema>,
		schema: Rc<dyn ValidationSchema>,
		default_values: FormValues,
		config: FormConfig,
	) -> FormResult<Self> {
		check_fields(&fields)?;
		let state = Self::initialize(&fields, &default_values);
		debug!(fields = fields.len(), mode = ?config.mode, "form initialised");
		Ok(Self {
			fields,
			schema,
			config,
			default_values,
			state,
		})
	}

	/// Initial state for a field list.
	///
	/// Each value resolves as `default_values[path]`, then the field's own
	/// default, then the empty value of its kind.
	///
	/// # Examples
	///
	/// ```
	/// use concierge_forms::{FieldSchema, FormEngine, FormValues};
	/// use serde_json::json;
	///
	/// let fields = vec![
	///     FieldSchema::text("name").with_default("Ava"),
	///     FieldSchema::checkbox("active"),
	/// ];
	/// let state = FormEngine::initialize(&fields, &FormValues::new());
	/// assert_eq!(state.value("name"), Some(&json!("Ava")));
	/// assert_eq!(state.value("active"), Some(&json!(false)));
	/// assert!(state.errors().is_empty());
	/// ```
	pub fn initialize(fields: &[FieldSchema], default_values: &FormValues) -> FormState {
		let values = fields
			.iter()
			.map(|field| {
				let value = field.initial_value(default_values.get(&field.path));
				(field.path.clone(), value)
			})
			.collect();
		FormState::new(values)
	}

	pub fn fields(&self) -> &[FieldSchema] {
		&self.fields
	}

	pub fn field(&self, path: &FieldPath) -> Option<&FieldSchema> {
		self.fields.iter().find(|field| &field.path == path)
	}

	pub fn config(&self) -> &FormConfig {
		&self.config
	}

	pub fn default_values(&self) -> &FormValues {
		&self.default_values
	}

	pub fn state(&self) -> &FormState {
		&self.state
	}

	/// Replaces the field list between renders.
	///
	/// Existing paths keep their live values and flags. New paths are
	/// initialised by the usual precedence, and removed paths lose their value,
	/// error and touched entries.
	pub fn reconcile_fields(&mut self, fields: Vec<FieldSchema>) -> FormResult<()> {
		check_fields(&fields)?;
		let current: BTreeSet<FieldPath> = fields.iter().map(|field| field.path.clone()).collect();

		let state = &mut self.state;
		state.values.retain(|path, _| current.contains(path));
		state.initial.retain(|path, _| current.contains(path));
		state.errors.retain(|path, _| current.contains(path));
		state.touched.retain(|path| current.contains(path));
		state.blurred.retain(|path| current.contains(path));

		let mut added = 0;
		for field in &fields {
			if state.values.contains_key(&field.path) {
				continue;
			}
			let value = field.initial_value(self.default_values.get(&field.path));
			state.initial.insert(field.path.clone(), value.clone());
			state.values.insert(field.path.clone(), value);
			added += 1;
		}
		debug!(fields = fields.len(), added, "fields reconciled");

		self.fields = fields;
		Ok(())
	}

	/// Records a new value for one field.
	pub fn set_field_value(
		&mut self,
		path: &FieldPath,
		value: Value,
		options: ChangeOptions,
	) -> FormResult<()> {
		if self.field(path).is_none() {
			warn!(field = %path, "rejected value for unknown field");
			return Err(FormError::UnknownField(path.clone()));
		}

		self.state.values.insert(path.clone(), value);
		if options.mark_dirty {
			self.state.dirty = true;
		}
		if options.mark_touched {
			self.state.touched.insert(path.clone());
		}
		if options.validate && self.validates_on_change(path) {
			self.validate_field(path)?;
		}
		Ok(())
	}

	/// Records that a field lost focus.
	pub fn blur_field(&mut self, path: &FieldPath) -> FormResult<()> {
		if self.field(path).is_none() {
			return Err(FormError::UnknownField(path.clone()));
		}
		self.state.touched.insert(path.clone());
		self.state.blurred.insert(path.clone());
		if self.validates_on_blur() {
			self.validate_field(path)?;
		}
		Ok(())
	}

	/// Validates the whole form but only updates this field's error.
	///
	/// Returns whether the field is valid.
	pub fn validate_field(&mut self, path: &FieldPath) -> FormResult<bool> {
		if self.field(path).is_none() {
			return Err(FormError::UnknownField(path.clone()));
		}
		let message = match self.run_validation() {
			Validation::Valid(_) => None,
			Validation::Invalid(mut errors) => errors.remove(path),
		};
		debug!(field = %path, valid = message.is_none(), "field validated");
		match message {
			Some(message) => {
				self.state.errors.insert(path.clone(), message);
				Ok(false)
			}
			None => {
				self.state.errors.remove(path);
				Ok(true)
			}
		}
	}

	/// Validates every field and replaces the error map with the result.
	pub fn validate_all(&mut self) -> Validation {
		let result = self.run_validation();
		match &result {
			Validation::Valid(_) => self.state.errors.clear(),
			Validation::Invalid(errors) => self.state.errors = errors.clone(),
		}
		debug!(errors = self.state.errors.len(), "form validated");
		result
	}

	/// Starts a submission: touches every field and validates.
	///
	/// On [`SubmitStep::Ready`] the form stays `submitting` until
	/// [`finish_submit`](Self::finish_submit).
	pub fn begin_submit(&mut self) -> SubmitStep {
		if self.state.submitting {
			debug!("submit ignored while another is in flight");
			return SubmitStep::Ignored;
		}
		self.state.submitting = true;
		self.state.submit_count += 1;
		self.state
			.touched
			.extend(self.fields.iter().map(|field| field.path.clone()));

		match self.validate_all() {
			Validation::Valid(data) => {
				debug!(attempt = self.state.submit_count, "submitting form");
				SubmitStep::Ready(data)
			}
			Validation::Invalid(errors) => {
				self.state.submitting = false;
				debug!(errors = errors.len(), "submit blocked by validation");
				SubmitStep::Invalid(errors)
			}
		}
	}

	pub fn finish_submit(&mut self) {
		self.state.submitting = false;
	}

	/// Restores the initial values and clears errors and interaction flags.
	pub fn reset(&mut self) {
		let state = &mut self.state;
		state.values = state.initial.clone();
		state.errors.clear();
		state.touched.clear();
		state.blurred.clear();
		state.dirty = false;
		state.submit_count = 0;
	}

	pub fn changes(&self) -> Vec<FieldChange> {
		self.state.changes()
	}

	fn validates_on_change(&self, path: &FieldPath) -> bool {
		self.config
			.mode
			.validates_on_change(self.state.blurred.contains(path))
			|| self.revalidates_on(RevalidateMode::OnChange)
	}

	fn validates_on_blur(&self) -> bool {
		self.config.mode.validates_on_blur() || self.revalidates_on(RevalidateMode::OnBlur)
	}

	fn revalidates_on(&self, trigger: RevalidateMode) -> bool {
		self.state.submit_count > 0 && self.config.revalidate == Some(trigger)
	}

	/// Field rules first, then the form schema over the coerced values.
	/// A schema message never replaces a field rule's message.
	fn run_validation(&self) -> Validation {
		let mut errors = FieldErrors::new();
		let mut coerced = self.state.values.clone();

		for field in &self.fields {
			let value = self
				.state
				.values
				.get(&field.path)
				.cloned()
				.unwrap_or(Value::Null);
			match field.check(&value) {
				Ok(value) => {
					coerced.insert(field.path.clone(), value);
				}
				Err(message) => {
					errors.insert(field.path.clone(), message);
				}
			}
		}

		match self.schema.validate(&coerced) {
			Validation::Valid(data) if errors.is_empty() => Validation::Valid(data),
			Validation::Valid(_) => Validation::Invalid(errors),
			Validation::Invalid(schema_errors) => {
				for (path, message) in schema_errors {
					errors.entry(path).or_insert(message);
				}
				Validation::Invalid(errors)
			}
		}
	}
}

fn check_fields(fields: &[FieldSchema]) -> FormResult<()> {
	let mut seen = BTreeSet::new();
	for field in fields {
		if field.path.exceeds_list_limit() {
			return Err(FormError::IndexOutOfRange(field.path.clone()));
		}
		if field.kind == FieldKind::Custom && field.widget.is_none() {
			return Err(FormError::MissingWidget(field.path.clone()));
		}
		if !seen.insert(&field.path) {
			return Err(FormError::DuplicateField(field.path.clone()));
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::ValidationMode;
	use crate::rules::Rule;
	use crate::validation::RuleSchema;
	use rstest::rstest;
	use serde_json::json;

	fn engine(mode: ValidationMode) -> FormEngine {
		FormEngine::new(
			vec![
				FieldSchema::email("email").with_rule(Rule::email().with_message("Invalid email")),
				FieldSchema::text("name"),
			],
			Rc::new(RuleSchema::new()),
			FormValues::new(),
			FormConfig::default().with_mode(mode),
		)
		.unwrap()
	}

	fn email() -> FieldPath {
		FieldPath::new("email")
	}

	#[rstest]
	fn test_duplicate_paths_rejected() {
		let result = FormEngine::new(
			vec![FieldSchema::text("a"), FieldSchema::email("a")],
			Rc::new(RuleSchema::new()),
			FormValues::new(),
			FormConfig::default(),
		);
		assert!(matches!(
			result,
			Err(FormError::DuplicateField(path)) if path == FieldPath::new("a")
		));
	}

	#[rstest]
	fn test_oversized_list_index_rejected() {
		let result = FormEngine::new(
			vec![FieldSchema::text("faq.18446744073709551615.question")],
			Rc::new(RuleSchema::new()),
			FormValues::new(),
			FormConfig::default(),
		);
		assert!(matches!(result, Err(FormError::IndexOutOfRange(_))));
	}

	#[rstest]
	fn test_custom_without_widget_rejected() {
		let result = FormEngine::new(
			vec![FieldSchema::new("otp", FieldKind::Custom)],
			Rc::new(RuleSchema::new()),
			FormValues::new(),
			FormConfig::default(),
		);
		assert!(matches!(result, Err(FormError::MissingWidget(_))));
	}

	#[rstest]
	fn test_unknown_field_rejected() {
		let mut engine = engine(ValidationMode::OnChange);
		let err = engine
			.set_field_value(&FieldPath::new("nope"), json!(1), ChangeOptions::user_edit())
			.unwrap_err();
		assert!(matches!(err, FormError::UnknownField(_)));
		assert!(engine.state().value("nope").is_none());
	}

	#[rstest]
	#[case(ValidationMode::OnSubmit, false)]
	#[case(ValidationMode::OnBlur, false)]
	#[case(ValidationMode::OnTouched, false)]
	#[case(ValidationMode::OnChange, true)]
	#[case(ValidationMode::All, true)]
	fn test_change_validation_per_mode(#[case] mode: ValidationMode, #[case] validated: bool) {
		let mut engine = engine(mode);
		engine
			.set_field_value(&email(), json!("a"), ChangeOptions::user_edit())
			.unwrap();
		assert_eq!(engine.state().error("email").is_some(), validated);
		assert!(engine.state().is_touched("email"));
		assert!(engine.state().is_dirty());
	}

	#[rstest]
	fn test_silent_change_leaves_flags() {
		let mut engine = engine(ValidationMode::OnChange);
		engine
			.set_field_value(&email(), json!("a"), ChangeOptions::silent())
			.unwrap();
		assert!(!engine.state().is_dirty());
		assert!(!engine.state().is_touched("email"));
		assert!(engine.state().errors().is_empty());
	}

	#[rstest]
	fn test_validate_field_only_touches_its_own_error() {
		let schema = |values: &FormValues| {
			let mut errors = FieldErrors::new();
			for path in values.keys() {
				errors.insert(path.clone(), "bad".to_string());
			}
			Validation::Invalid(errors)
		};
		let mut engine = FormEngine::new(
			vec![FieldSchema::text("a"), FieldSchema::text("b")],
			Rc::new(schema),
			FormValues::new(),
			FormConfig::default(),
		)
		.unwrap();

		assert!(!engine.validate_field(&FieldPath::new("a")).unwrap());
		assert_eq!(engine.state().error("a"), Some("bad"));
		assert_eq!(engine.state().error("b"), None);
	}

	#[rstest]
	fn test_field_rule_message_wins_over_schema() {
		let schema = RuleSchema::new()
			.field("name", [Rule::min_length(3).with_message("too short")])
			.field("bio", [Rule::min_length(3).with_message("too short")]);
		let mut engine = FormEngine::new(
			vec![
				FieldSchema::text("name").with_rule(Rule::max_length(1).with_message("too long")),
				FieldSchema::text("bio"),
			],
			Rc::new(schema),
			[
				(FieldPath::new("name"), json!("ab")),
				(FieldPath::new("bio"), json!("ab")),
			]
			.into_iter()
			.collect(),
			FormConfig::default(),
		)
		.unwrap();
		let result = engine.validate_all();
		let errors = result.errors().unwrap();
		assert_eq!(errors.get(&FieldPath::new("name")).map(String::as_str), Some("too long"));
		assert_eq!(errors.get(&FieldPath::new("bio")).map(String::as_str), Some("too short"));
		assert_eq!(engine.state().errors(), errors);
	}

	#[rstest]
	fn test_begin_submit_marks_all_touched_and_counts() {
		let mut engine = engine(ValidationMode::OnSubmit);
		let step = engine.begin_submit();
		assert!(matches!(step, SubmitStep::Ready(_)));
		assert!(engine.state().is_submitting());
		assert_eq!(engine.state().submit_count(), 1);
		assert!(engine.state().is_touched("email"));
		assert!(engine.state().is_touched("name"));

		assert_eq!(engine.begin_submit(), SubmitStep::Ignored);
		assert_eq!(engine.state().submit_count(), 1);

		engine.finish_submit();
		assert!(!engine.state().is_submitting());
	}

	#[rstest]
	#[case(RevalidateMode::OnChange, true, false)]
	#[case(RevalidateMode::OnBlur, false, true)]
	#[case(RevalidateMode::OnSubmit, false, false)]
	fn test_revalidate_after_failed_submit(
		#[case] revalidate: RevalidateMode,
		#[case] on_change: bool,
		#[case] on_blur: bool,
	) {
		let mut engine = FormEngine::new(
			vec![FieldSchema::text("name").required()],
			Rc::new(RuleSchema::new()),
			FormValues::new(),
			FormConfig::default()
				.with_mode(ValidationMode::OnSubmit)
				.with_revalidate(revalidate),
		)
		.unwrap();
		let name = FieldPath::new("name");
		assert!(matches!(engine.begin_submit(), SubmitStep::Invalid(_)));
		assert!(!engine.state().is_submitting());

		engine
			.set_field_value(&name, json!("Ava"), ChangeOptions::user_edit())
			.unwrap();
		assert_eq!(engine.state().error("name").is_none(), on_change);

		engine.blur_field(&name).unwrap();
		assert_eq!(engine.state().error("name").is_none(), on_change || on_blur);
	}

	#[rstest]
	#[case(ValidationMode::All)]
	#[case(ValidationMode::OnBlur)]
	#[case(ValidationMode::OnChange)]
	#[case(ValidationMode::OnSubmit)]
	fn test_mode_triggers_survive_submit(#[case] mode: ValidationMode) {
		let mut engine = FormEngine::new(
			vec![FieldSchema::text("name").required()],
			Rc::new(RuleSchema::new()),
			[(FieldPath::new("name"), json!("Ava"))].into_iter().collect(),
			FormConfig::default().with_mode(mode),
		)
		.unwrap();
		let name = FieldPath::new("name");
		assert!(matches!(engine.begin_submit(), SubmitStep::Ready(_)));
		engine.finish_submit();

		engine
			.set_field_value(&name, json!(""), ChangeOptions::user_edit())
			.unwrap();
		assert_eq!(
			engine.state().error("name").is_some(),
			mode.validates_on_change(false)
		);

		engine.blur_field(&name).unwrap();
		assert_eq!(
			engine.state().error("name"),
			(mode.validates_on_change(false) || mode.validates_on_blur())
				.then_some("This field is required.")
		);
	}

	#[rstest]
	fn test_revalidate_adds_to_mode_triggers() {
		let mut engine = FormEngine::new(
			vec![FieldSchema::text("name").required()],
			Rc::new(RuleSchema::new()),
			[(FieldPath::new("name"), json!("Ava"))].into_iter().collect(),
			FormConfig::default()
				.with_mode(ValidationMode::All)
				.with_revalidate(RevalidateMode::OnSubmit),
		)
		.unwrap();
		let name = FieldPath::new("name");
		assert!(matches!(engine.begin_submit(), SubmitStep::Ready(_)));
		engine.finish_submit();

		engine
			.set_field_value(&name, json!(""), ChangeOptions::silent())
			.unwrap();
		assert!(engine.state().errors().is_empty());
		engine.blur_field(&name).unwrap();
		assert_eq!(engine.state().error("name"), Some("This field is required."));
	}

	#[rstest]
	fn test_reset_restores_initial_snapshot() {
		let mut engine = engine(ValidationMode::OnChange);
		engine
			.set_field_value(&email(), json!("a"), ChangeOptions::user_edit())
			.unwrap();
		assert_eq!(engine.changes().len(), 1);

		engine.reset();
		assert_eq!(engine.state().value("email"), Some(&json!("")));
		assert!(engine.state().errors().is_empty());
		assert!(engine.state().touched().is_empty());
		assert!(!engine.state().is_dirty());
		assert!(engine.changes().is_empty());
	}
}
