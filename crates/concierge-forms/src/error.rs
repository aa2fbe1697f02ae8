use crate::path::FieldPath;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("Duplicate field path: {0}")]
	DuplicateField(FieldPath),
	#[error("Unknown field: {0}")]
	UnknownField(FieldPath),
	#[error("Field path {0} addresses a list index above {max}", max = crate::path::MAX_LIST_INDEX)]
	IndexOutOfRange(FieldPath),
	#[error("Custom field {0} does not name a widget")]
	MissingWidget(FieldPath),
	#[error("Invalid form configuration: {0}")]
	Config(String),
	/// The caller's submit handler failed; the form is no longer submitting.
	#[error("Submit handler failed: {0:#}")]
	Submit(anyhow::Error),
}

pub type FormResult<T> = Result<T, FormError>;

impl From<serde_json::Error> for FormError {
	fn from(e: serde_json::Error) -> Self {
		FormError::Config(e.to_string())
	}
}

impl From<toml::de::Error> for FormError {
	fn from(e: toml::de::Error) -> Self {
		FormError::Config(e.to_string())
	}
}
