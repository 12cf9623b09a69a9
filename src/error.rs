//! Unified error type for the application.
//!
//! Store, template, and workflow failures all funnel into [`Error`]; the
//! server maps the variants to user-facing pages at the top level.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Entity lookup produced no document
	#[error("not found: {0}")]
	NotFound(String),

	/// A submitted value failed a field rule outside the normal form flow
	#[error("validation failed: {0}")]
	Validation(String),

	/// Admin password mismatch on a protected endpoint
	#[error("authorization failed: {0}")]
	Authorization(String),

	/// A multi-document unit of work was rolled back
	#[error("transaction aborted: {0}")]
	TransactionAborted(String),

	/// A store invariant does not hold (e.g. the default category vanished)
	#[error("invariant violated: {0}")]
	Invariant(String),

	/// Unique-index violation on insert
	#[error("duplicate key: {0}")]
	Duplicate(String),

	/// Connection failure against the document store
	#[error("connection error: {0}")]
	Connection(String),

	/// Any other store-level failure
	#[error("database error: {0}")]
	Database(String),

	/// Document could not be (de)serialized
	#[error("serialization error: {0}")]
	Serialization(String),

	/// Template lookup or rendering failed
	#[error("template error: {0}")]
	Template(String),

	/// Invalid or missing environment configuration
	#[error("configuration error: {0}")]
	Config(String),
}

impl From<mongodb::error::Error> for Error {
	fn from(err: mongodb::error::Error) -> Self {
		use mongodb::error::{ErrorKind, WriteFailure};

		match &*err.kind {
			ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == 11000 => {
				Error::Duplicate(err.to_string())
			}
			ErrorKind::Io(_) => Error::Connection(err.to_string()),
			_ => Error::Database(err.to_string()),
		}
	}
}

impl From<bson::error::Error> for Error {
	fn from(err: bson::error::Error) -> Self {
		Error::Serialization(err.to_string())
	}
}

impl From<tera::Error> for Error {
	fn from(err: tera::Error) -> Self {
		Error::Template(err.to_string())
	}
}
