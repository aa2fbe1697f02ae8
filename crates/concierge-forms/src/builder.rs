//! Form builder
//!
//! Collects everything a form needs before it mounts and hands back a
//! [`FormHandle`].
//!
//! ## Example
//!
//! ```
//! use concierge_forms::{FieldPath, FieldSchema, FormBuilder, Rule, RuleSchema, ValidationMode};
//! use serde_json::json;
//!
//! let schema = RuleSchema::new().field("email", [Rule::email().with_message("Invalid email")]);
//! let form = FormBuilder::new(schema)
//!     .field(FieldSchema::email("email").with_label("Email"))
//!     .default_value("email", json!("support@example.com"))
//!     .mode(ValidationMode::OnTouched)
//!     .on_submit(|data| async move {
//!         assert!(data.get("email").is_some());
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(form.value("email"), Some(json!("support@example.com")));
//! ```

use crate::config::{FormConfig, FormDefinition, ValidationMode};
use crate::engine::FormEngine;
use crate::error::FormResult;
use crate::handle::{FormHandle, SubmitHandler};
use crate::path::FieldPath;
use crate::schema::FieldSchema;
use crate::validation::{FormData, FormValues, ValidationSchema};
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::rc::Rc;

type ReadyCallback = Box<dyn FnOnce(&FormHandle)>;

pub struct FormBuilder {
	schema: Rc<dyn ValidationSchema>,
	fields: Vec<FieldSchema>,
	default_values: FormValues,
	config: FormConfig,
	on_submit: Option<SubmitHandler>,
	on_ready: Vec<ReadyCallback>,
}

impl FormBuilder {
	pub fn new(schema: impl ValidationSchema + 'static) -> Self {
		Self {
			schema: Rc::new(schema),
			fields: Vec::new(),
			default_values: FormValues::new(),
			config: FormConfig::default(),
			on_submit: None,
			on_ready: Vec::new(),
		}
	}

	/// Starts from a form declared as data.
	pub fn from_definition(
		definition: FormDefinition,
		schema: impl ValidationSchema + 'static,
	) -> Self {
		Self::new(schema)
			.fields(definition.fields)
			.default_values(definition.default_values)
			.config(definition.config)
	}

	pub fn field(mut self, field: FieldSchema) -> Self {
		self.fields.push(field);
		self
	}

	pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSchema>) -> Self {
		self.fields.extend(fields);
		self
	}

	pub fn default_value(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
		self.default_values.insert(path.into(), value.into());
		self
	}

	pub fn default_values(mut self, values: FormValues) -> Self {
		self.default_values.extend(values);
		self
	}

	pub fn config(mut self, config: FormConfig) -> Self {
		self.config = config;
		self
	}

	pub fn mode(mut self, mode: ValidationMode) -> Self {
		self.config.mode = mode;
		self
	}

	pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
	where
		F: Fn(FormData) -> Fut + 'static,
		Fut: Future<Output = anyhow::Result<()>> + 'static,
	{
		self.on_submit = Some(Rc::new(move |data| handler(data).boxed_local()));
		self
	}

	/// Runs once with the new handle, right after the form is built.
	pub fn on_form_ready(mut self, callback: impl FnOnce(&FormHandle) + 'static) -> Self {
		self.on_ready.push(Box::new(callback));
		self
	}

	pub fn build(self) -> FormResult<FormHandle> {
		let engine = FormEngine::new(self.fields, self.schema, self.default_values, self.config)?;
		let handle = FormHandle::new(engine, self.on_submit);
		for callback in self.on_ready {
			callback(&handle);
		}
		Ok(handle)
	}
}
