use core::time::Duration;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong between the catalog, bookmark storage and the page.
///
/// Callers that only need "it failed, with a human-readable message" can rely on [`Display`](core::fmt::Display).
/// The variants stay distinct for diagnostics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// The catalog did not answer within the configured bound.
	///
	/// The request itself was abandoned, not cancelled.
	#[error("request took too long, timed out after {} second(s)", .0.as_secs_f64())]
	Timeout(Duration),

	/// The catalog answered with a failure status.
	#[error("{message} ({status})")]
	Api { status: u16, message: String },

	/// A response body was not valid JSON or did not have the expected envelope shape.
	#[error("could not decode catalog response: {0}")]
	Decode(#[from] serde_json::Error),

	/// The request could not be sent or its body could not be read.
	#[error("transport failure: {0}")]
	Transport(String),

	/// Local input was rejected before any network call was made.
	#[error("{0}")]
	Validation(String),

	/// Durable bookmark storage could not be read or written.
	#[error("bookmark storage failure: {0}")]
	Storage(String),

	/// Old and new fragments don't share a template shape, so positional patching would produce garbage.
	#[error("fragment shape mismatch: expected {expected}, found {found}")]
	ShapeMismatch { expected: String, found: String },

	/// A DOM call threw.
	#[error("DOM operation failed: {0}")]
	Dom(String),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Renders a thrown JavaScript value for one of the string-carrying variants.
pub(crate) fn describe_js(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
