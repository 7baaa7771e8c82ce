use thiserror::Error;

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, loading or walking a model.
///
/// Reaching a prefix with no recorded successor is not an error: the walk
/// simply ends.
#[derive(Error, Debug)]
pub enum Error {
	/// The n-gram size must be at least one token
	#[error("ngram size must be >= 1, got {0}")]
	InvalidNgramSize(usize),

	/// No prefix of the model satisfies the start predicate
	#[error("no prefix satisfies the start predicate")]
	NoValidStart,

	/// Two models of different order cannot be merged
	#[error("ngram size mismatch: expected {expected}, found {found}")]
	NgramSizeMismatch { expected: usize, found: usize },

	/// A caller supplied parameter is out of range
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// Every attempt ended before a complete entry was produced
	#[error("generation failed after {0} attempt(s)")]
	GenerationFailed(usize),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Binary model cache could not be encoded or decoded
	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

impl Error {
	/// Create an invalid input error
	pub fn invalid_input(msg: impl Into<String>) -> Self {
		Self::InvalidInput(msg.into())
	}
}
