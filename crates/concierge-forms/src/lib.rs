//! Schema-driven form engine for the Concierge console
//!
//! This crate holds everything about a form that is independent of how it is
//! drawn:
//! - Field schemas and typed field paths for indexed collections
//! - Per-field rules and caller-supplied validation schemas
//! - Form state with touched/dirty tracking and change detection
//! - Validation trigger modes and the submit lifecycle
//! - Form definitions loaded from JSON or TOML
//!
//! ## Example
//!
//! ```
//! use concierge_forms::{
//!     ChangeOptions, FieldPath, FieldSchema, FormBuilder, Rule, RuleSchema, ValidationMode,
//! };
//! use serde_json::json;
//!
//! let form = FormBuilder::new(RuleSchema::new())
//!     .field(FieldSchema::email("email").with_rule(Rule::email().with_message("Invalid email")))
//!     .mode(ValidationMode::OnTouched)
//!     .build()
//!     .unwrap();
//!
//! let email = FieldPath::new("email");
//! form.set_field_value(&email, json!("a"), ChangeOptions::user_edit()).unwrap();
//! assert_eq!(form.with_state(|s| s.visible_error("email").map(str::to_owned)), None);
//!
//! form.blur(&email).unwrap();
//! assert_eq!(
//!     form.with_state(|s| s.visible_error("email").map(str::to_owned)),
//!     Some("Invalid email".to_string())
//! );
//! ```

pub mod builder;
pub mod changes;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod path;
pub mod rules;
pub mod schema;
pub mod state;
pub mod validation;

pub use builder::FormBuilder;
pub use changes::{FieldChange, diff, diff_values};
pub use config::{FormConfig, FormDefinition, RevalidateMode, ValidationMode};
pub use engine::{ChangeOptions, FormEngine, SubmitStep};
pub use error::{FormError, FormResult};
pub use handle::{FormHandle, SubmitHandler, SubmitOutcome};
pub use path::{FieldPath, MAX_LIST_INDEX, PathSegment};
pub use rules::Rule;
pub use schema::{FieldKind, FieldOption, FieldSchema};
pub use state::FormState;
pub use validation::{FieldErrors, FormData, FormValues, RuleSchema, Validation, ValidationSchema};
