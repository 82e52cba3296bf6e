//! Error types for dataset loading.

use thiserror::Error;

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Why a manifest or dataset could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
	/// The request never produced a response.
	#[error("request to {url} failed: {reason}")]
	Network {
		/// Requested URL.
		url: String,
		/// Browser-reported reason.
		reason: String,
	},

	/// The server answered with a non-success status.
	#[error("{url} answered with HTTP {status}")]
	Status {
		/// Requested URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},

	/// A document did not match its expected JSON shape.
	#[error("malformed {what}: {source}")]
	Parse {
		/// Which document failed.
		what: &'static str,
		/// Underlying decode error.
		#[source]
		source: serde_json::Error,
	},

	/// Local filesystem access failed while scanning datasets.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl LoadError {
	pub(crate) fn parse(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
		move |source| Self::Parse { what, source }
	}
}
