//! Form component
//!
//! [`FormComponent`] renders a whole form (header, fields, footer, submit
//! button) and wires the `<form>` submit event to [`FormHandle::submit`].
//! Every part can be replaced through an override while the state contract
//! stays the same: edits still go through the renderer's handlers and the
//! button still reflects `submitting`.
//!
//! ## Layout
//!
//! ```text
//! <form>
//!   header            render_header(state)
//!   field | group     render_field(slot) / render_field_group(name, fields)
//!   footer            render_footer(state)
//!   button            render_button(state)
//! </form>
//! ```
//!
//! Fields sharing a `group` are rendered together at the position of the
//! group's first field.
//!
//! ## Submission
//!
//! The submit handler is async and may be `!Send`, so the component does not
//! pick an executor: it hands the submission future to a caller-supplied
//! spawner.

use crate::binding::WidgetRegistry;
use crate::error::RenderResult;
use crate::preferences::{PreferencesStore, SKIP_DISCARD_CONFIRMATION};
use crate::renderer::FieldRenderer;
use crate::view::{Event, EventType, View};
use concierge_forms::{FieldSchema, FormError, FormHandle, FormResult, FormState, SubmitOutcome};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use tracing::{debug, warn};

/// Runs a submission future to completion on the caller's executor.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// Everything an override needs to draw one field.
pub struct FieldSlot<'a> {
	pub field: &'a FieldSchema,
	/// The stock rendering of the field
	pub view: View,
	pub renderer: &'a FieldRenderer,
}

/// What the submit button should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
	pub label: String,
	pub submitting: bool,
	/// Whether any value differs from its initial one
	pub has_changes: bool,
}

type FieldOverride = Rc<dyn Fn(FieldSlot<'_>) -> View>;
type GroupOverride = Rc<dyn Fn(&str, Vec<View>) -> View>;
type StateOverride = Rc<dyn Fn(&FormState) -> View>;
type ButtonOverride = Rc<dyn Fn(&ButtonState) -> View>;
type SubmitErrorHandler = Rc<dyn Fn(&FormError)>;

#[derive(Clone, Default)]
struct Overrides {
	field: Option<FieldOverride>,
	group: Option<GroupOverride>,
	header: Option<StateOverride>,
	footer: Option<StateOverride>,
	button: Option<ButtonOverride>,
}

#[derive(Clone)]
pub struct FormComponent {
	handle: FormHandle,
	renderer: FieldRenderer,
	spawner: Spawner,
	overrides: Overrides,
	on_submit_error: Option<SubmitErrorHandler>,
}

enum Block<'a> {
	Field(&'a FieldSchema),
	Group(&'a str, Vec<&'a FieldSchema>),
}

impl FormComponent {
	pub fn new(
		handle: FormHandle,
		widgets: WidgetRegistry,
		spawner: impl Fn(LocalBoxFuture<'static, ()>) + 'static,
	) -> Self {
		Self {
			renderer: FieldRenderer::new(handle.clone(), widgets),
			handle,
			spawner: Rc::new(spawner),
			overrides: Overrides::default(),
			on_submit_error: None,
		}
	}

	pub fn with_render_field(mut self, f: impl Fn(FieldSlot<'_>) -> View + 'static) -> Self {
		self.overrides.field = Some(Rc::new(f));
		self
	}

	pub fn with_render_field_group(
		mut self,
		f: impl Fn(&str, Vec<View>) -> View + 'static,
	) -> Self {
		self.overrides.group = Some(Rc::new(f));
		self
	}

	pub fn with_render_header(mut self, f: impl Fn(&FormState) -> View + 'static) -> Self {
		self.overrides.header = Some(Rc::new(f));
		self
	}

	pub fn with_render_footer(mut self, f: impl Fn(&FormState) -> View + 'static) -> Self {
		self.overrides.footer = Some(Rc::new(f));
		self
	}

	pub fn with_render_button(mut self, f: impl Fn(&ButtonState) -> View + 'static) -> Self {
		self.overrides.button = Some(Rc::new(f));
		self
	}

	/// Called when a submission started from the `<form>` element fails.
	pub fn on_submit_error(mut self, f: impl Fn(&FormError) + 'static) -> Self {
		self.on_submit_error = Some(Rc::new(f));
		self
	}

	pub fn handle(&self) -> &FormHandle {
		&self.handle
	}

	pub fn renderer(&self) -> &FieldRenderer {
		&self.renderer
	}

	/// Submits the form imperatively, as a parent page would.
	pub async fn submit(&self) -> FormResult<SubmitOutcome> {
		self.handle.submit().await
	}

	/// Whether leaving the page should ask before discarding edits.
	pub fn should_confirm_discard(&self, preferences: &PreferencesStore) -> bool {
		!self.handle.changes().is_empty() && !preferences.flag(SKIP_DISCARD_CONFIRMATION)
	}

	pub fn button_state(&self) -> ButtonState {
		let config = self.handle.config();
		let submitting = self.handle.is_submitting();
		ButtonState {
			label: if submitting {
				config.busy_label
			} else {
				config.submit_label
			},
			submitting,
			has_changes: !self.handle.changes().is_empty(),
		}
	}

	pub fn render(&self) -> RenderResult<View> {
		let state = self.handle.snapshot();
		let fields = self.handle.fields();

		let mut body = Vec::new();
		for block in blocks(&fields) {
			match block {
				Block::Field(field) => body.push(self.render_field(field)?),
				Block::Group(name, members) => {
					let views = members
						.into_iter()
						.map(|field| self.render_field(field))
						.collect::<RenderResult<Vec<_>>>()?;
					body.push(self.render_field_group(name, views));
				}
			}
		}

		let header = match &self.overrides.header {
			Some(f) => f(&state),
			None => View::empty(),
		};
		let footer = match &self.overrides.footer {
			Some(f) => f(&state),
			None => View::empty(),
		};

		Ok(View::element("form")
			.attr("class", "concierge-form")
			.attr("novalidate", "")
			.attr_opt("aria-busy", state.is_submitting().then_some("true"))
			.child(header)
			.children(body)
			.child(footer)
			.child(self.render_button())
			.on(EventType::Submit, self.submit_listener())
			.into())
	}

	fn render_field(&self, field: &FieldSchema) -> RenderResult<View> {
		let view = self.renderer.render(field)?;
		Ok(match &self.overrides.field {
			Some(f) => f(FieldSlot {
				field,
				view,
				renderer: &self.renderer,
			}),
			None => view,
		})
	}

	fn render_field_group(&self, name: &str, fields: Vec<View>) -> View {
		match &self.overrides.group {
			Some(f) => f(name, fields),
			None => View::element("fieldset")
				.attr("class", "field-group")
				.attr("data-group", name.to_string())
				.children(fields)
				.into(),
		}
	}

	fn render_button(&self) -> View {
		let state = self.button_state();
		match &self.overrides.button {
			Some(f) => f(&state),
			None => View::element("button")
				.attr("type", "submit")
				.flag("disabled", state.submitting)
				.attr_opt("aria-busy", state.submitting.then_some("true"))
				.child(state.label)
				.into(),
		}
	}

	fn submit_listener(&self) -> impl Fn(&Event) + 'static {
		let handle = self.handle.clone();
		let spawner = self.spawner.clone();
		let on_error = self.on_submit_error.clone();
		move |event| {
			event.prevent_default();
			let handle = handle.clone();
			let on_error = on_error.clone();
			spawner(
				async move {
					match handle.submit().await {
						Ok(outcome) => debug!(?outcome, "form submit settled"),
						Err(e) => match &on_error {
							Some(f) => f(&e),
							None => warn!(error = %e, "form submit failed"),
						},
					}
				}
				.boxed_local(),
			);
		}
	}
}

/// Orders fields into blocks, gathering each group at its first member.
fn blocks(fields: &[FieldSchema]) -> Vec<Block<'_>> {
	let mut out: Vec<Block<'_>> = Vec::new();
	for field in fields {
		let Some(group) = field.group.as_deref() else {
			out.push(Block::Field(field));
			continue;
		};
		let existing = out.iter_mut().find_map(|block| match block {
			Block::Group(name, members) if *name == group => Some(members),
			_ => None,
		});
		match existing {
			Some(members) => members.push(field),
			None => out.push(Block::Group(group, vec![field])),
		}
	}
	out
}
