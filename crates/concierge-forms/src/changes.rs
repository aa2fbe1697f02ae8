//! Change detection
//!
//! Deep diff of plain JSON values, reported per leaf path. The form state uses
//! it to compare live values with the snapshot taken at initialisation, which
//! is what "Save" buttons and discard confirmations key off.

use crate::path::FieldPath;
use crate::validation::FormValues;
use serde_json::Value;
use std::collections::BTreeSet;

/// One differing leaf. `None` means the path is absent on that side.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
	pub path: FieldPath,
	pub before: Option<Value>,
	pub after: Option<Value>,
}

/// Diffs two JSON documents.
///
/// # Examples
///
/// ```
/// use concierge_forms::changes::diff;
/// use serde_json::json;
///
/// let changes = diff(
///     &json!({"tone": "formal", "tags": ["a", "b"]}),
///     &json!({"tone": "formal", "tags": ["a", "c"]}),
/// );
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].path.to_string(), "tags.1");
/// ```
pub fn diff(before: &Value, after: &Value) -> Vec<FieldChange> {
	let mut out = Vec::new();
	diff_at(&FieldPath::root(), Some(before), Some(after), &mut out);
	out
}

/// Diffs two flat value maps, descending into nested values.
pub fn diff_values(before: &FormValues, after: &FormValues) -> Vec<FieldChange> {
	let paths: BTreeSet<&FieldPath> = before.keys().chain(after.keys()).collect();
	let mut out = Vec::new();
	for path in paths {
		diff_at(path, before.get(path), after.get(path), &mut out);
	}
	out
}

fn diff_at(
	path: &FieldPath,
	before: Option<&Value>,
	after: Option<&Value>,
	out: &mut Vec<FieldChange>,
) {
	match (before, after) {
		(Some(Value::Object(left)), Some(Value::Object(right))) => {
			let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
			for key in keys {
				diff_at(&path.clone().key(key.as_str()), left.get(key), right.get(key), out);
			}
		}
		(Some(Value::Array(left)), Some(Value::Array(right))) => {
			for index in 0..left.len().max(right.len()) {
				diff_at(&path.clone().index(index), left.get(index), right.get(index), out);
			}
		}
		_ if before == after => {}
		_ => out.push(FieldChange {
			path: path.clone(),
			before: before.cloned(),
			after: after.cloned(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_identical_documents_have_no_changes() {
		let doc = json!({"a": [1, {"b": null}], "c": "x"});
		assert!(diff(&doc, &doc).is_empty());
	}

	#[rstest]
	fn test_added_and_removed_keys() {
		let changes = diff(&json!({"a": 1}), &json!({"b": 2}));
		assert_eq!(
			changes,
			vec![
				FieldChange {
					path: FieldPath::new("a"),
					before: Some(json!(1)),
					after: None,
				},
				FieldChange {
					path: FieldPath::new("b"),
					before: None,
					after: Some(json!(2)),
				},
			]
		);
	}

	#[rstest]
	fn test_type_change_is_reported_whole() {
		let changes = diff(&json!({"a": [1]}), &json!({"a": "1"}));
		assert_eq!(changes.len(), 1);
		assert_eq!(changes[0].path, FieldPath::new("a"));
	}

	#[rstest]
	fn test_grown_list_reports_new_items() {
		let changes = diff(&json!([1]), &json!([1, 2, 3]));
		let paths: Vec<String> = changes.iter().map(|c| c.path.to_string()).collect();
		assert_eq!(paths, vec!["1", "2"]);
	}

	#[rstest]
	fn test_diff_values_over_flat_maps() {
		let mut before = FormValues::new();
		before.insert(FieldPath::new("name"), json!("Ava"));
		before.insert(FieldPath::new("tags"), json!(["vip"]));
		let mut after = before.clone();
		after.insert(FieldPath::new("tags"), json!(["vip", "beta"]));
		after.insert(FieldPath::item("faq", 0, "question"), json!(""));

		let changes = diff_values(&before, &after);
		let paths: Vec<String> = changes.iter().map(|c| c.path.to_string()).collect();
		assert_eq!(paths, vec!["faq.0.question", "tags.1"]);
	}
}
