//! Form rendering for the Concierge console
//!
//! This crate draws forms managed by `concierge-forms`:
//! - A view tree that renders to HTML and dispatches element events
//! - The field renderer, one element shape per field kind
//! - Field bindings and a registry of custom widgets
//! - The form component with header, footer, field and button overrides
//! - An explicit user-preferences store
//!
//! ## Example
//!
//! ```
//! use concierge_forms::{FieldSchema, FormBuilder, RuleSchema};
//! use concierge_pages::{Event, EventType, FormComponent, WidgetRegistry};
//!
//! let form = FormBuilder::new(RuleSchema::new())
//!     .field(FieldSchema::text("name").with_label("Assistant name").required())
//!     .build()
//!     .unwrap();
//! let component = FormComponent::new(form.clone(), WidgetRegistry::with_builtin(), |_| {});
//!
//! let view = component.render().unwrap();
//! view.find_by_attr("name", "name")
//!     .unwrap()
//!     .dispatch(EventType::Input, &Event::with_value("Ava"));
//!
//! assert_eq!(form.value("name"), Some(serde_json::json!("Ava")));
//! assert!(view.render_to_string().contains(r#"<label for="id_name">Assistant name</label>"#));
//! ```

pub mod binding;
pub mod component;
pub mod error;
pub mod preferences;
pub mod renderer;
pub mod view;
pub mod widgets;

pub use binding::{CustomWidget, FieldBinding, WidgetRegistry};
pub use component::{ButtonState, FieldSlot, FormComponent, Spawner};
pub use error::{RenderError, RenderResult};
pub use preferences::{Preferences, PreferencesError, PreferencesStore};
pub use renderer::FieldRenderer;
pub use view::{ElementView, Event, EventHandler, EventType, IntoView, View};
pub use widgets::{ChipSelect, OtpInput, PhoneInput};
