//! Property-based tests for the form engine
//!
//! Uses proptest to verify:
//! 1. Every field gets an initial value, resolved by the documented precedence
//! 2. Validating twice without edits gives the same result
//! 3. Errors are only visible on touched fields

use concierge_forms::{
	ChangeOptions, FieldPath, FieldSchema, FormConfig, FormEngine, FormValues, Rule, RuleSchema,
	ValidationMode,
};
use proptest::prelude::*;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug, Clone)]
struct FieldCase {
	name: String,
	form_default: Option<String>,
	field_default: Option<String>,
	checkbox: bool,
}

fn field_cases() -> impl Strategy<Value = Vec<FieldCase>> {
	prop::collection::btree_set("[a-z]{1,8}", 1..8).prop_flat_map(|names| {
		let count = names.len();
		(
			Just(names),
			prop::collection::vec(
				(
					prop::option::of("[a-z ]{0,6}"),
					prop::option::of("[a-z ]{0,6}"),
					any::<bool>(),
				),
				count,
			),
		)
			.prop_map(|(names, flags)| {
				names
					.into_iter()
					.zip(flags)
					.map(|(name, (form_default, field_default, checkbox))| FieldCase {
						name,
						form_default,
						field_default,
						checkbox,
					})
					.collect()
			})
	})
}

fn build(cases: &[FieldCase]) -> (Vec<FieldSchema>, FormValues) {
	let mut defaults = FormValues::new();
	let fields = cases
		.iter()
		.map(|case| {
			let mut field = if case.checkbox {
				FieldSchema::checkbox(case.name.as_str())
			} else {
				FieldSchema::text(case.name.as_str())
			};
			if let Some(value) = &case.field_default {
				field = field.with_default(value.as_str());
			}
			if let Some(value) = &case.form_default {
				defaults.insert(FieldPath::new(case.name.as_str()), json!(value));
			}
			field
		})
		.collect();
	(fields, defaults)
}

fn rules_schema() -> RuleSchema {
	RuleSchema::new()
		.field("name", [Rule::required(), Rule::max_length(5)])
		.field("email", [Rule::email()])
		.field("age", [Rule::number(), Rule::min_value(18.0)])
}

fn rules_engine() -> FormEngine {
	FormEngine::new(
		vec![
			FieldSchema::text("name"),
			FieldSchema::email("email"),
			FieldSchema::number("age"),
		],
		Rc::new(rules_schema()),
		FormValues::new(),
		FormConfig::default().with_mode(ValidationMode::OnChange),
	)
	.unwrap()
}

fn any_value() -> impl Strategy<Value = Value> {
	prop_oneof![
		Just(Value::Null),
		any::<bool>().prop_map(Value::Bool),
		any::<i32>().prop_map(|n| json!(n)),
		"[a-z0-9@. ]{0,10}".prop_map(Value::String),
	]
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	/// Property: the value map covers exactly the field paths, with the right source
	#[test]
	fn test_initialize_completeness_and_precedence(cases in field_cases()) {
		let (fields, defaults) = build(&cases);
		let state = FormEngine::initialize(&fields, &defaults);

		let expected: BTreeSet<FieldPath> = fields.iter().map(|f| f.path.clone()).collect();
		let actual: BTreeSet<FieldPath> = state.values().keys().cloned().collect();
		prop_assert_eq!(actual, expected);
		prop_assert!(state.errors().is_empty());
		prop_assert!(state.touched().is_empty());
		prop_assert!(!state.is_dirty());
		prop_assert!(!state.is_submitting());

		for case in &cases {
			let expected = match (&case.form_default, &case.field_default) {
				(Some(value), _) => json!(value),
				(None, Some(value)) => json!(value),
				(None, None) if case.checkbox => json!(false),
				(None, None) => json!(""),
			};
			prop_assert_eq!(state.value(case.name.as_str()), Some(&expected));
		}
	}

	/// Property: validate_all is idempotent without intervening edits
	#[test]
	fn test_validate_all_idempotent(name in any_value(), email in any_value(), age in any_value()) {
		let mut engine = rules_engine();
		for (path, value) in [("name", name), ("email", email), ("age", age)] {
			engine
				.set_field_value(&FieldPath::new(path), value, ChangeOptions::silent())
				.unwrap();
		}

		let first = engine.validate_all();
		let errors_after_first = engine.state().errors().clone();
		let second = engine.validate_all();

		prop_assert_eq!(first, second);
		prop_assert_eq!(engine.state().errors(), &errors_after_first);
	}

	/// Property: an error is displayed only when the field is touched
	#[test]
	fn test_errors_visible_only_when_touched(
		value in any_value(),
		touch in any::<bool>(),
	) {
		let mut engine = rules_engine();
		let options = ChangeOptions {
			validate: true,
			mark_dirty: true,
			mark_touched: touch,
		};
		engine
			.set_field_value(&FieldPath::new("email"), value, options)
			.unwrap();

		let state = engine.state();
		prop_assert_eq!(state.is_touched("email"), touch);
		match state.visible_error("email") {
			Some(message) => {
				prop_assert!(touch);
				prop_assert_eq!(Some(message), state.error("email"));
			}
			None => prop_assert!(!touch || state.error("email").is_none()),
		}
	}
}
