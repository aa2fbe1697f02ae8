use concierge_forms::{FieldPath, FormError};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	#[error("No widget registered as '{widget}' for field {field}")]
	UnknownWidget { field: FieldPath, widget: String },
	#[error(transparent)]
	Form(#[from] FormError),
}

pub type RenderResult<T> = Result<T, RenderError>;
