//! Shared form handle
//!
//! A [`FormHandle`] is the imperative face of one form: renderers, widgets and
//! the page that owns the form all hold clones of it. It wraps the engine in
//! `Rc<RefCell<_>>`, so it is single-threaded, and it owns the async half of
//! submission.
//!
//! ## Submission
//!
//! [`FormHandle::submit`] validates synchronously, then awaits the submit
//! handler with no borrow of the engine held. A guard resets `submitting` when
//! the handler settles, whether it resolved, returned an error, panicked or
//! the submit future itself was dropped.

use crate::changes::FieldChange;
use crate::config::FormConfig;
use crate::engine::{ChangeOptions, FormEngine, SubmitStep};
use crate::error::{FormError, FormResult};
use crate::path::FieldPath;
use crate::schema::FieldSchema;
use crate::state::FormState;
use crate::validation::{FieldErrors, FormData, Validation};
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Caller-supplied submit callback.
pub type SubmitHandler = Rc<dyn Fn(FormData) -> LocalBoxFuture<'static, anyhow::Result<()>>>;

type Watcher = Rc<dyn Fn(&FormState)>;

/// How a call to [`FormHandle::submit`] ended without a handler error.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
	/// The handler ran and resolved
	Submitted,
	/// Validation failed; the handler was not called
	Invalid(FieldErrors),
	/// Another submission was still in flight
	Ignored,
}

#[derive(Clone)]
pub struct FormHandle {
	engine: Rc<RefCell<FormEngine>>,
	on_submit: Option<SubmitHandler>,
	watchers: Rc<RefCell<Vec<Watcher>>>,
	/// Set when a submission ended while the engine was borrowed
	pending_finish: Rc<Cell<bool>>,
}

impl fmt::Debug for FormHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormHandle")
			.field("state", &self.engine.borrow().state())
			.field("watchers", &self.watchers.borrow().len())
			.finish()
	}
}

impl FormHandle {
	pub fn new(engine: FormEngine, on_submit: Option<SubmitHandler>) -> Self {
		Self {
			engine: Rc::new(RefCell::new(engine)),
			on_submit,
			watchers: Rc::new(RefCell::new(Vec::new())),
			pending_finish: Rc::new(Cell::new(false)),
		}
	}

	/// Registers a callback run after every state change.
	pub fn watch(&self, watcher: impl Fn(&FormState) + 'static) {
		self.watchers.borrow_mut().push(Rc::new(watcher));
	}

	/// Copy of the current state.
	pub fn snapshot(&self) -> FormState {
		self.engine().state().clone()
	}

	pub fn with_state<R>(&self, f: impl FnOnce(&FormState) -> R) -> R {
		f(self.engine().state())
	}

	pub fn fields(&self) -> Vec<FieldSchema> {
		self.engine().fields().to_vec()
	}

	pub fn field(&self, path: &FieldPath) -> Option<FieldSchema> {
		self.engine().field(path).cloned()
	}

	pub fn config(&self) -> FormConfig {
		self.engine().config().clone()
	}

	pub fn value(&self, path: impl Into<FieldPath>) -> Option<Value> {
		self.engine().state().value(path).cloned()
	}

	pub fn is_submitting(&self) -> bool {
		self.engine().state().is_submitting()
	}

	pub fn set_field_value(
		&self,
		path: &FieldPath,
		value: Value,
		options: ChangeOptions,
	) -> FormResult<()> {
		self.engine_mut().set_field_value(path, value, options)?;
		self.notify();
		Ok(())
	}

	/// Programmatic update: no flags, no validation.
	pub fn set_value(&self, path: impl Into<FieldPath>, value: impl Into<Value>) -> FormResult<()> {
		self.set_field_value(&path.into(), value.into(), ChangeOptions::silent())
	}

	pub fn blur(&self, path: &FieldPath) -> FormResult<()> {
		self.engine_mut().blur_field(path)?;
		self.notify();
		Ok(())
	}

	pub fn validate_field(&self, path: &FieldPath) -> FormResult<bool> {
		let valid = self.engine_mut().validate_field(path)?;
		self.notify();
		Ok(valid)
	}

	pub fn validate_all(&self) -> Validation {
		let result = self.engine_mut().validate_all();
		self.notify();
		result
	}

	pub fn reconcile_fields(&self, fields: Vec<FieldSchema>) -> FormResult<()> {
		self.engine_mut().reconcile_fields(fields)?;
		self.notify();
		Ok(())
	}

	pub fn reset(&self) {
		self.engine_mut().reset();
		self.notify();
	}

	pub fn changes(&self) -> Vec<FieldChange> {
		self.engine().changes()
	}

	/// Validates and, when the data is valid, awaits the submit handler.
	///
	/// A handler error is returned as [`FormError::Submit`]; the form is no
	/// longer submitting by the time the caller sees it.
	///
	/// # Examples
	///
	/// ```
	/// use concierge_forms::{FieldSchema, FormBuilder, RuleSchema, SubmitOutcome};
	///
	/// let form = FormBuilder::new(RuleSchema::new())
	///     .field(FieldSchema::text("name").required())
	///     .on_submit(|_data| async { Ok(()) })
	///     .build()
	///     .unwrap();
	///
	/// let outcome = futures::executor::block_on(form.submit()).unwrap();
	/// assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
	/// assert!(!form.is_submitting());
	/// ```
	pub async fn submit(&self) -> FormResult<SubmitOutcome> {
		let step = self.engine_mut().begin_submit();
		let data = match step {
			SubmitStep::Ignored => return Ok(SubmitOutcome::Ignored),
			SubmitStep::Invalid(errors) => {
				self.notify();
				return Ok(SubmitOutcome::Invalid(errors));
			}
			SubmitStep::Ready(data) => data,
		};

		let guard = SubmittingGuard { handle: self };
		self.notify();

		let result = match &self.on_submit {
			Some(handler) => handler(data).await,
			None => Ok(()),
		};
		drop(guard);

		match result {
			Ok(()) => {
				debug!("form submitted");
				Ok(SubmitOutcome::Submitted)
			}
			Err(error) => {
				warn!(error = %error, "submit handler failed");
				Err(FormError::Submit(error))
			}
		}
	}

	fn engine(&self) -> Ref<'_, FormEngine> {
		self.settle();
		self.engine.borrow()
	}

	fn engine_mut(&self) -> RefMut<'_, FormEngine> {
		self.settle();
		self.engine.borrow_mut()
	}

	/// Applies a submit reset the guard could not apply itself.
	fn settle(&self) {
		if !self.pending_finish.get() {
			return;
		}
		if let Ok(mut engine) = self.engine.try_borrow_mut() {
			engine.finish_submit();
			self.pending_finish.set(false);
			debug!("deferred submit reset applied");
		}
	}

	fn notify(&self) {
		let watchers = self.watchers.borrow().clone();
		if watchers.is_empty() {
			return;
		}
		let state = self.snapshot();
		for watcher in watchers {
			watcher(&state);
		}
	}
}

/// Clears `submitting` when a submission settles or is abandoned.
struct SubmittingGuard<'a> {
	handle: &'a FormHandle,
}

impl Drop for SubmittingGuard<'_> {
	fn drop(&mut self) {
		match self.handle.engine.try_borrow_mut() {
			Ok(mut engine) => engine.finish_submit(),
			Err(_) => {
				// Applied by the handle's next engine access
				debug!("engine borrowed while finishing submit; reset deferred");
				self.handle.pending_finish.set(true);
				return;
			}
		}
		if !std::thread::panicking() {
			self.handle.notify();
		}
	}
}
