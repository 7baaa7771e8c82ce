use serde::{Deserialize, Serialize};

use super::markov_model::starts_uppercase;
use super::walker::WalkEnd;
use crate::error::{Error, Result};

/// Strategy used to select the starting prefix of a walk.
///
/// # Variants
/// - `Uppercase`: any prefix whose first token starts with an uppercase
///   letter, which is where names and sentences begin.
/// - `Token(String)`: a prefix whose first token is exactly this word.
/// - `Any`: any prefix of the model.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum StartSeed {
	#[default]
	Uppercase,
	Token(String),
	Any,
}

impl StartSeed {
	/// Returns true if a prefix starting with `token` may open a walk.
	pub fn accepts(&self, token: &str) -> bool {
		match self {
			StartSeed::Uppercase => starts_uppercase(token),
			StartSeed::Token(word) => word == token,
			StartSeed::Any => true,
		}
	}
}

/// Parameters of one generation request.
///
/// # Responsibilities
/// - Track the retry budget (`nb_try`) used to avoid incomplete or
///   already known entries
/// - Bound each walk to `max_tokens` tokens, since a walk may never end
/// - Select the start prefix and the end-of-walk policy
///
/// # Invariants
/// - `max_tokens` is always >= 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GenerationInput {
	/// Number of extra attempts when an attempt is incomplete or duplicated.
	pub nb_try: usize,

	/// Maximum number of tokens consumed from one walk.
	max_tokens: usize,

	/// What the walk does on reaching a terminal prefix.
	pub walk_end: WalkEnd,

	/// How the first prefix is chosen.
	pub start_seed: StartSeed,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self { nb_try: 5, max_tokens: 64, walk_end: WalkEnd::Flush, start_seed: StartSeed::Uppercase }
	}
}

impl GenerationInput {
	/// Returns the current token cap.
	pub fn max_tokens(&self) -> usize {
		self.max_tokens
	}

	/// Sets the token cap.
	///
	/// # Errors
	/// Returns an error if `max_tokens` is zero.
	pub fn set_max_tokens(&mut self, max_tokens: usize) -> Result<()> {
		if max_tokens == 0 {
			return Err(Error::invalid_input("max_tokens must be >= 1"));
		}
		self.max_tokens = max_tokens;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let input = GenerationInput::default();
		assert_eq!(input.nb_try, 5);
		assert_eq!(input.max_tokens(), 64);
		assert_eq!(input.walk_end, WalkEnd::Flush);
		assert_eq!(input.start_seed, StartSeed::Uppercase);
	}

	#[test]
	fn test_max_tokens_validation() {
		let mut input = GenerationInput::default();
		assert!(input.set_max_tokens(0).is_err());
		assert_eq!(input.max_tokens(), 64);
		input.set_max_tokens(12).unwrap();
		assert_eq!(input.max_tokens(), 12);
	}

	#[test]
	fn test_start_seed_predicates() {
		assert!(StartSeed::Uppercase.accepts("Koa"));
		assert!(!StartSeed::Uppercase.accepts("koa"));
		assert!(StartSeed::Token("koa".into()).accepts("koa"));
		assert!(!StartSeed::Token("koa".into()).accepts("Koa"));
		assert!(StartSeed::Any.accepts("::"));
	}
}
