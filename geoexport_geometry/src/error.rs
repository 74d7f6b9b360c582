use thiserror::Error;

/// Failures that end an export as a whole.
///
/// They travel inside `anyhow::Error`; use `err.downcast_ref::<ExportError>()` to tell them
/// apart from I/O failures.
#[derive(Debug, Error)]
pub enum ExportError {
	/// Not a single feature survived normalization.
	#[error("no features to export for '{name}'")]
	NoFeatures { name: String },

	/// The feature source could not be opened.
	#[error("feature source failed: {0:#}")]
	Source(anyhow::Error),

	#[error("parse GeoJSON failed: {0}")]
	InvalidGeoJson(String),
}
