//! Field renderer
//!
//! Turns a [`FieldSchema`] into a view with its events wired back into the
//! form:
//!
//! | Kind | Element | Emits |
//! |------|---------|-------|
//! | text, email, password, number, tel, date | `<input type=…>` | input text |
//! | textarea | `<textarea>` | input text |
//! | select | `<select>` | option value (array when `multiple`) |
//! | checkbox | `<input type="checkbox">` | boolean |
//! | radio | one `<input type="radio">` per option | option value |
//! | custom | registered [`CustomWidget`](crate::CustomWidget) | whatever the widget sets |
//!
//! Changes are user edits (dirty, touched, validated per trigger mode) and
//! blurs go through [`FormHandle::blur`]. Error messages are shown only for
//! touched fields.

use crate::binding::{FieldBinding, WidgetRegistry};
use crate::error::{RenderError, RenderResult};
use crate::view::{ElementView, EventType, View};
use concierge_forms::{ChangeOptions, FieldKind, FieldPath, FieldSchema, FormError, FormHandle};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::warn;

#[derive(Clone)]
pub struct FieldRenderer {
	handle: FormHandle,
	widgets: WidgetRegistry,
	/// Password fields currently shown in clear text
	revealed: Rc<RefCell<BTreeSet<FieldPath>>>,
}

impl FieldRenderer {
	pub fn new(handle: FormHandle, widgets: WidgetRegistry) -> Self {
		Self {
			handle,
			widgets,
			revealed: Rc::new(RefCell::new(BTreeSet::new())),
		}
	}

	pub fn handle(&self) -> &FormHandle {
		&self.handle
	}

	pub fn widgets(&self) -> &WidgetRegistry {
		&self.widgets
	}

	pub fn is_password_revealed(&self, path: &FieldPath) -> bool {
		self.revealed.borrow().contains(path)
	}

	/// Flips the show/hide state of a password field; returns the new state.
	pub fn toggle_password(&self, path: &FieldPath) -> bool {
		toggle(&self.revealed, path)
	}

	/// Renders a field with its label, help text and error message.
	///
	/// Custom widgets are returned as they render themselves, followed by the
	/// error message.
	pub fn render(&self, field: &FieldSchema) -> RenderResult<View> {
		let control = self.render_control(field)?;
		let error = self.render_error(&field.path);
		if field.kind == FieldKind::Custom {
			return Ok(View::fragment(vec![control, error]));
		}

		let label = field.label.clone().map(|text| {
			View::element("label")
				.attr("for", field.path.html_id())
				.child(text)
		});
		let help = field.help_text.clone().map(|text| {
			View::element("p")
				.attr("class", "help-text")
				.attr("id", format!("{}-help", field.path.html_id()))
				.child(text)
		});

		let mut class = format!("field field-{}", kind_name(field.kind));
		if !error.is_empty() {
			class.push_str(" field-invalid");
		}
		Ok(View::element("div")
			.attr("class", class)
			.child(label)
			.child(control)
			.child(help)
			.child(error)
			.into())
	}

	/// Renders only the input element(s) of a field.
	pub fn render_control(&self, field: &FieldSchema) -> RenderResult<View> {
		let value = self.current_value(&field.path);
		let view = match field.kind {
			FieldKind::Password => self.render_password(field, &value),
			FieldKind::Textarea => self.render_textarea(field, &value),
			FieldKind::Select => self.render_select(field, &value),
			FieldKind::Checkbox => self.render_checkbox(field, &value),
			FieldKind::Radio => self.render_radio(field, &value),
			FieldKind::Custom => return self.render_custom(field),
			FieldKind::Text
			| FieldKind::Email
			| FieldKind::Number
			| FieldKind::Tel
			| FieldKind::Date => {
				let input_type = field.kind.input_type().unwrap_or("text");
				self.render_input(field, &value, input_type).into()
			}
		};
		Ok(view)
	}

	/// Inline error message for a touched field, or nothing.
	pub fn render_error(&self, path: &FieldPath) -> View {
		let message = self
			.handle
			.with_state(|state| state.visible_error(path).map(str::to_owned));
		match message {
			Some(message) => View::element("p")
				.attr("class", "field-error")
				.attr("id", format!("{}-error", path.html_id()))
				.attr("role", "alert")
				.child(message)
				.into(),
			None => View::empty(),
		}
	}

	fn current_value(&self, path: &FieldPath) -> Value {
		self.handle.value(path).unwrap_or(Value::Null)
	}

	fn has_error(&self, path: &FieldPath) -> bool {
		self.handle
			.with_state(|state| state.visible_error(path).is_some())
	}

	/// Attributes shared by every native control.
	fn base(&self, tag: &'static str, field: &FieldSchema) -> ElementView {
		let element = View::element(tag)
			.attr("name", field.name())
			.attr("id", field.path.html_id())
			.attr_opt("placeholder", field.placeholder.clone())
			.flag("required", field.required)
			.flag("disabled", field.disabled);
		self.with_error_attrs(element, &field.path)
	}

	/// Points the element at its inline error while one is shown.
	fn with_error_attrs(&self, element: ElementView, path: &FieldPath) -> ElementView {
		let invalid = self.has_error(path);
		element
			.attr_opt("aria-invalid", invalid.then_some("true"))
			.attr_opt("aria-describedby", invalid.then(|| format!("{}-error", path.html_id())))
	}

	fn with_text_events(&self, element: ElementView, path: &FieldPath) -> ElementView {
		let on_input = self.handle.clone();
		let input_path = path.clone();
		let on_blur = self.handle.clone();
		let blur_path = path.clone();
		element
			.on(EventType::Input, move |event| {
				let value = Value::String(event.value().unwrap_or_default().to_owned());
				edit(&on_input, &input_path, value);
			})
			.on(EventType::Blur, move |_| blur(&on_blur, &blur_path))
	}

	fn render_input(
		&self,
		field: &FieldSchema,
		value: &Value,
		input_type: &'static str,
	) -> ElementView {
		let element = self
			.base("input", field)
			.attr("type", input_type)
			.attr("value", display_value(value));
		self.with_text_events(element, &field.path)
	}

	fn render_password(&self, field: &FieldSchema, value: &Value) -> View {
		let revealed = self.is_password_revealed(&field.path);
		let input = self.render_input(field, value, if revealed { "text" } else { "password" });

		let state = self.revealed.clone();
		let path = field.path.clone();
		let toggle_button = View::element("button")
			.attr("type", "button")
			.attr("class", "password-toggle")
			.attr("aria-controls", field.path.html_id())
			.attr("aria-pressed", revealed.to_string())
			.child(if revealed { "Hide" } else { "Show" })
			.on(EventType::Click, move |_| {
				toggle(&state, &path);
			});

		View::element("div")
			.attr("class", "password-input")
			.child(input)
			.child(toggle_button)
			.into()
	}

	fn render_textarea(&self, field: &FieldSchema, value: &Value) -> View {
		let element = self.base("textarea", field).child(display_value(value));
		self.with_text_events(element, &field.path).into()
	}

	fn render_select(&self, field: &FieldSchema, value: &Value) -> View {
		let options = field.options.iter().enumerate().map(|(index, option)| {
			let selected = match value {
				Value::Array(items) if field.multiple => items.contains(&option.value),
				_ => *value == option.value,
			};
			View::element("option")
				.attr("value", index.to_string())
				.flag("selected", selected)
				.child(option.label.clone())
		});
		let placeholder = field
			.placeholder
			.clone()
			.filter(|_| !field.multiple)
			.map(|text| View::element("option").attr("value", "").child(text));

		let on_change = self.handle.clone();
		let schema = field.clone();
		let on_blur = self.handle.clone();
		let blur_path = field.path.clone();
		let select = View::element("select")
			.attr("name", field.name())
			.attr("id", field.path.html_id())
			.flag("multiple", field.multiple)
			.flag("required", field.required)
			.flag("disabled", field.disabled);
		self.with_error_attrs(select, &field.path)
			.child(placeholder)
			.children(options.collect::<Vec<_>>())
			.on(EventType::Change, move |event| {
				let chosen: Vec<Value> = event
					.selected()
					.iter()
					.filter_map(|index| schema.option_value(*index).cloned())
					.collect();
				let value = if schema.multiple {
					Value::Array(chosen)
				} else {
					chosen.into_iter().next().unwrap_or_else(|| schema.empty_value())
				};
				edit(&on_change, &schema.path, value);
			})
			.on(EventType::Blur, move |_| blur(&on_blur, &blur_path))
			.into()
	}

	fn render_checkbox(&self, field: &FieldSchema, value: &Value) -> View {
		let on_change = self.handle.clone();
		let change_path = field.path.clone();
		let on_blur = self.handle.clone();
		let blur_path = field.path.clone();
		self.base("input", field)
			.attr("type", "checkbox")
			.flag("checked", value.as_bool().unwrap_or(false))
			.on(EventType::Change, move |event| {
				let checked = event.checked().unwrap_or(false);
				edit(&on_change, &change_path, Value::Bool(checked));
			})
			.on(EventType::Blur, move |_| blur(&on_blur, &blur_path))
			.into()
	}

	fn render_radio(&self, field: &FieldSchema, value: &Value) -> View {
		let buttons = field.options.iter().enumerate().map(|(index, option)| {
			let on_change = self.handle.clone();
			let change_path = field.path.clone();
			let chosen = option.value.clone();
			let on_blur = self.handle.clone();
			let blur_path = field.path.clone();
			let input = View::element("input")
				.attr("type", "radio")
				.attr("name", field.name())
				.attr("id", format!("{}_{}", field.path.html_id(), index))
				.attr("value", index.to_string())
				.flag("checked", *value == option.value)
				.flag("required", field.required)
				.flag("disabled", field.disabled)
				.on(EventType::Change, move |_| edit(&on_change, &change_path, chosen.clone()))
				.on(EventType::Blur, move |_| blur(&on_blur, &blur_path));
			View::element("label")
				.attr("for", format!("{}_{}", field.path.html_id(), index))
				.child(input)
				.child(format!(" {}", option.label))
		});

		let group = View::element("div")
			.attr("role", "radiogroup")
			.attr("id", field.path.html_id());
		self.with_error_attrs(group, &field.path)
			.children(buttons.collect::<Vec<_>>())
			.into()
	}

	fn render_custom(&self, field: &FieldSchema) -> RenderResult<View> {
		let Some(id) = field.widget.as_deref() else {
			return Err(FormError::MissingWidget(field.path.clone()).into());
		};
		let Some(widget) = self.widgets.get(id) else {
			warn!(field = %field.path, widget = id, "no widget registered");
			return Err(RenderError::UnknownWidget {
				field: field.path.clone(),
				widget: id.to_string(),
			});
		};
		let binding = FieldBinding::new(self.handle.clone(), field.path.clone());
		Ok(widget.render(field, binding))
	}
}

fn toggle(revealed: &RefCell<BTreeSet<FieldPath>>, path: &FieldPath) -> bool {
	let mut revealed = revealed.borrow_mut();
	if revealed.remove(path) {
		false
	} else {
		revealed.insert(path.clone());
		true
	}
}

fn edit(handle: &FormHandle, path: &FieldPath, value: Value) {
	if let Err(e) = handle.set_field_value(path, value, ChangeOptions::user_edit()) {
		warn!(field = %path, error = %e, "edit rejected");
	}
}

fn blur(handle: &FormHandle, path: &FieldPath) {
	if let Err(e) = handle.blur(path) {
		warn!(field = %path, error = %e, "blur rejected");
	}
}

/// Text shown inside an input for a stored value.
fn display_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

fn kind_name(kind: FieldKind) -> &'static str {
	match kind {
		FieldKind::Text => "text",
		FieldKind::Email => "email",
		FieldKind::Password => "password",
		FieldKind::Number => "number",
		FieldKind::Tel => "tel",
		FieldKind::Date => "date",
		FieldKind::Select => "select",
		FieldKind::Textarea => "textarea",
		FieldKind::Checkbox => "checkbox",
		FieldKind::Radio => "radio",
		FieldKind::Custom => "custom",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(null), "")]
	#[case(json!("Ava"), "Ava")]
	#[case(json!(42), "42")]
	#[case(json!(true), "true")]
	fn test_display_value(#[case] value: Value, #[case] expected: &str) {
		assert_eq!(display_value(&value), expected);
	}

	#[rstest]
	fn test_toggle_flips() {
		let state = RefCell::new(BTreeSet::new());
		let path = FieldPath::new("secret");
		assert!(toggle(&state, &path));
		assert!(!toggle(&state, &path));
		assert!(state.borrow().is_empty());
	}
}
