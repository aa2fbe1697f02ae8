//! Field bindings and custom widgets
//!
//! A [`FieldBinding`] is everything a custom widget may know about the form
//! it lives in: the field's name, its current value and a way to set it.
//! Setting goes through the same engine call as the built-in inputs, so a
//! custom widget is validated under the form's trigger mode like any other
//! field.
//!
//! Widgets are looked up by id in a [`WidgetRegistry`], which the
//! [`FieldRenderer`](crate::FieldRenderer) consults for
//! [`FieldKind::Custom`](concierge_forms::FieldKind::Custom) fields.
//!
//! ## Example
//!
//! ```
//! use concierge_forms::{FieldSchema, FormBuilder, RuleSchema};
//! use concierge_pages::{Event, EventType, FieldBinding, FieldRenderer, View, WidgetRegistry};
//!
//! let widgets = WidgetRegistry::new().with("shout", |_field: &FieldSchema, binding: FieldBinding| {
//!     View::from(
//!         View::element("input")
//!             .attr("name", binding.name())
//!             .on(EventType::Input, move |event| {
//!                 binding.set(event.value().unwrap_or_default().to_uppercase());
//!             }),
//!     )
//! });
//! let form = FormBuilder::new(RuleSchema::new())
//!     .field(FieldSchema::custom("greeting", "shout"))
//!     .build()
//!     .unwrap();
//!
//! let view = FieldRenderer::new(form.clone(), widgets)
//!     .render(&form.fields()[0])
//!     .unwrap();
//! view.find_by_attr("name", "greeting")
//!     .unwrap()
//!     .dispatch(EventType::Input, &Event::with_value("hi"));
//! assert_eq!(form.value("greeting"), Some(serde_json::json!("HI")));
//! ```

use crate::view::View;
use crate::widgets::{ChipSelect, OtpInput, PhoneInput};
use concierge_forms::{ChangeOptions, FieldPath, FieldSchema, FormHandle, FormResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Neutral binding between one field and its form.
#[derive(Clone)]
pub struct FieldBinding {
	handle: FormHandle,
	path: FieldPath,
	value: Value,
}

impl fmt::Debug for FieldBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldBinding")
			.field("path", &self.path)
			.field("value", &self.value)
			.finish()
	}
}

impl FieldBinding {
	pub fn new(handle: FormHandle, path: FieldPath) -> Self {
		let value = handle.value(&path).unwrap_or(Value::Null);
		Self {
			handle,
			path,
			value,
		}
	}

	/// Dotted field name, as used for the HTML `name` attribute.
	pub fn name(&self) -> String {
		self.path.to_string()
	}

	pub fn path(&self) -> &FieldPath {
		&self.path
	}

	/// Value at the time the binding was created (render time).
	pub fn value(&self) -> &Value {
		&self.value
	}

	/// Live value from the form; use inside event handlers.
	pub fn current(&self) -> Value {
		self.handle.value(&self.path).unwrap_or(Value::Null)
	}

	/// Error to display for this field, if any.
	pub fn error(&self) -> Option<String> {
		self.handle
			.with_state(|state| state.visible_error(&self.path).map(str::to_owned))
	}

	/// Records a user edit. Failures are logged; see [`try_set`](Self::try_set).
	pub fn set(&self, value: impl Into<Value>) {
		if let Err(e) = self.try_set(value) {
			warn!(field = %self.path, error = %e, "custom widget edit rejected");
		}
	}

	pub fn try_set(&self, value: impl Into<Value>) -> FormResult<()> {
		self.handle
			.set_field_value(&self.path, value.into(), ChangeOptions::user_edit())
	}

	pub fn blur(&self) {
		if let Err(e) = self.handle.blur(&self.path) {
			warn!(field = %self.path, error = %e, "custom widget blur rejected");
		}
	}

	pub fn handle(&self) -> &FormHandle {
		&self.handle
	}
}

/// Renders a [`FieldKind::Custom`](concierge_forms::FieldKind::Custom) field.
pub trait CustomWidget {
	fn render(&self, field: &FieldSchema, binding: FieldBinding) -> View;
}

impl<F> CustomWidget for F
where
	F: Fn(&FieldSchema, FieldBinding) -> View,
{
	fn render(&self, field: &FieldSchema, binding: FieldBinding) -> View {
		self(field, binding)
	}
}

/// Custom widgets indexed by id.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
	widgets: HashMap<String, Rc<dyn CustomWidget>>,
}

impl fmt::Debug for WidgetRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut ids: Vec<&String> = self.widgets.keys().collect();
		ids.sort();
		f.debug_struct("WidgetRegistry").field("widgets", &ids).finish()
	}
}

impl WidgetRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry preloaded with `otp`, `phone` and `chips`.
	pub fn with_builtin() -> Self {
		Self::new()
			.with("otp", OtpInput::default())
			.with("phone", PhoneInput::default())
			.with("chips", ChipSelect)
	}

	/// Registers a widget, replacing any previous one with the same id.
	pub fn register(&mut self, id: impl Into<String>, widget: impl CustomWidget + 'static) {
		self.widgets.insert(id.into(), Rc::new(widget));
	}

	pub fn with(mut self, id: impl Into<String>, widget: impl CustomWidget + 'static) -> Self {
		self.register(id, widget);
		self
	}

	pub fn get(&self, id: &str) -> Option<Rc<dyn CustomWidget>> {
		self.widgets.get(id).cloned()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.widgets.contains_key(id)
	}
}
