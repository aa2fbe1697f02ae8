//! # Concierge
//!
//! Schema-driven forms for the Concierge assistant console.
//!
//! A form is described by a list of [`FieldSchema`](forms::FieldSchema)
//! entries, optional default values and a validation schema. The engine keeps
//! the live values, per-field errors and the touched/dirty flags; the pages
//! layer turns each field into a view with its event wiring attached.
//!
//! ## Feature Flags
//!
//! - `forms` - Form state engine, validation and the submit lifecycle
//! - `pages` (default, implies `forms`) - Field renderer, custom widgets and
//!   the form component
//!
//! ## Example
//!
//! ```
//! use concierge::prelude::*;
//!
//! let form = FormBuilder::new(RuleSchema::new())
//!     .field(FieldSchema::email("support.email").with_label("Support email").required())
//!     .mode(ValidationMode::OnTouched)
//!     .build()
//!     .unwrap();
//!
//! let email = FieldPath::parse("support.email");
//! form.set_field_value(&email, "not-an-email".into(), ChangeOptions::user_edit())
//!     .unwrap();
//! assert!(form.snapshot().error("support.email").is_none());
//!
//! form.blur(&email).unwrap();
//! assert_eq!(
//!     form.snapshot().visible_error("support.email"),
//!     Some("Enter a valid email address.")
//! );
//! ```

#[cfg(feature = "forms")]
pub mod forms;
#[cfg(feature = "pages")]
pub mod pages;

pub mod prelude {
	#[cfg(feature = "forms")]
	pub use crate::forms::{
		ChangeOptions, FieldKind, FieldOption, FieldPath, FieldSchema, FormBuilder, FormConfig,
		FormData, FormError, FormHandle, FormResult, FormState, RevalidateMode, Rule, RuleSchema,
		SubmitOutcome, Validation, ValidationMode, ValidationSchema,
	};

	#[cfg(feature = "pages")]
	pub use crate::pages::{
		CustomWidget, Event, EventType, FieldBinding, FieldRenderer, FormComponent,
		PreferencesStore, RenderError, View, WidgetRegistry,
	};
}
