//! Form state
//!
//! Snapshot of one form's values, errors and interaction flags. The engine is
//! the only writer; everything else reads.

use crate::changes::{FieldChange, diff_values};
use crate::path::FieldPath;
use crate::validation::{FieldErrors, FormValues};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
	pub(crate) values: FormValues,
	/// Values as initialised, for change detection and reset
	pub(crate) initial: FormValues,
	pub(crate) errors: FieldErrors,
	pub(crate) touched: BTreeSet<FieldPath>,
	pub(crate) blurred: BTreeSet<FieldPath>,
	pub(crate) dirty: bool,
	pub(crate) submitting: bool,
	pub(crate) submit_count: u32,
}

impl FormState {
	pub(crate) fn new(values: FormValues) -> Self {
		Self {
			initial: values.clone(),
			values,
			..Self::default()
		}
	}

	pub fn values(&self) -> &FormValues {
		&self.values
	}

	pub fn value(&self, path: impl Into<FieldPath>) -> Option<&Value> {
		self.values.get(&path.into())
	}

	pub fn initial_values(&self) -> &FormValues {
		&self.initial
	}

	pub fn errors(&self) -> &FieldErrors {
		&self.errors
	}

	pub fn error(&self, path: impl Into<FieldPath>) -> Option<&str> {
		self.errors.get(&path.into()).map(String::as_str)
	}

	/// The error to display next to a field: only once the field was touched.
	pub fn visible_error(&self, path: impl Into<FieldPath>) -> Option<&str> {
		let path = path.into();
		if !self.touched.contains(&path) {
			return None;
		}
		self.errors.get(&path).map(String::as_str)
	}

	pub fn touched(&self) -> &BTreeSet<FieldPath> {
		&self.touched
	}

	pub fn is_touched(&self, path: impl Into<FieldPath>) -> bool {
		self.touched.contains(&path.into())
	}

	pub fn is_blurred(&self, path: impl Into<FieldPath>) -> bool {
		self.blurred.contains(&path.into())
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub fn is_submitting(&self) -> bool {
		self.submitting
	}

	pub fn submit_count(&self) -> u32 {
		self.submit_count
	}

	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	/// Differences between the live values and the initial snapshot.
	pub fn changes(&self) -> Vec<FieldChange> {
		diff_values(&self.initial, &self.values)
	}

	pub fn has_changes(&self) -> bool {
		!self.changes().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn state() -> FormState {
		let mut values = FormValues::new();
		values.insert(FieldPath::new("email"), json!("a"));
		let mut state = FormState::new(values);
		state
			.errors
			.insert(FieldPath::new("email"), "Invalid email".to_string());
		state
	}

	#[rstest]
	fn test_error_hidden_until_touched() {
		let mut state = state();
		assert_eq!(state.error("email"), Some("Invalid email"));
		assert_eq!(state.visible_error("email"), None);

		state.touched.insert(FieldPath::new("email"));
		assert_eq!(state.visible_error("email"), Some("Invalid email"));
	}

	#[rstest]
	fn test_changes_against_initial_snapshot() {
		let mut state = state();
		assert!(!state.has_changes());

		state.values.insert(FieldPath::new("email"), json!("a@b.com"));
		let changes = state.changes();
		assert_eq!(changes.len(), 1);
		assert_eq!(changes[0].before, Some(json!("a")));
		assert_eq!(changes[0].after, Some(json!("a@b.com")));
	}
}
