//! Facade integration tests
//!
//! A form declared in TOML, built and rendered through the `concierge`
//! prelude.

use concierge::forms::FormDefinition;
use concierge::prelude::*;
use rstest::{fixture, rstest};
use serde_json::json;

const ASSISTANT_FORM: &str = r#"
[config]
mode = "onChange"
submit_label = "Update assistant"

[default_values]
"assistant.name" = "Ava"

[[fields]]
name = "assistant.name"
kind = "text"
label = "Name"
required = true

[[fields]]
name = "support.email"
kind = "email"
label = "Support email"
group = "contact"
"#;

#[fixture]
fn form() -> FormHandle {
	let definition = FormDefinition::from_toml(ASSISTANT_FORM).unwrap();
	FormBuilder::from_definition(definition, RuleSchema::new())
		.build()
		.unwrap()
}

#[rstest]
fn test_declared_form_renders_through_facade(form: FormHandle) {
	let component = FormComponent::new(form.clone(), WidgetRegistry::with_builtin(), |_| {});
	let view = component.render().unwrap();
	let html = view.render_to_string();

	assert!(html.contains(r#"<label for="id_assistant-name">Name</label>"#));
	assert!(html.contains(r#"value="Ava""#));
	assert!(html.contains(r#"data-group="contact""#));
	assert!(html.contains("Update assistant"));
}

#[rstest]
fn test_declared_form_validates_on_change(form: FormHandle) {
	let component = FormComponent::new(form.clone(), WidgetRegistry::with_builtin(), |_| {});
	let view = component.render().unwrap();

	view.find_by_attr("name", "support.email")
		.unwrap()
		.dispatch(EventType::Input, &Event::with_value("ava@"));

	let state = form.snapshot();
	assert_eq!(state.value("support.email"), Some(&json!("ava@")));
	assert_eq!(
		state.visible_error("support.email"),
		Some("Enter a valid email address.")
	);
	assert!(state.is_dirty());
	assert!(state.is_touched("support.email"));
	assert!(!form.validate_all().is_valid());
}
