use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::prefix::Prefix;
use super::random::RandomRange;
use super::state::{State, SuffixFrequency};
use super::walker::Walk;
use crate::error::{Error, Result};

/// Represents an n-gram Markov model over string tokens.
///
/// The `MarkovModel` maps every prefix of `ngram_size` consecutive tokens
/// to the successors observed right after it, with their counts.
///
/// # Responsibilities
/// - Build the frequency table from a token stream
/// - Select a starting prefix matching a predicate
/// - Hand out lazy walks over the table
/// - Merge with another model of the same order
///
/// # Invariants
/// - `ngram_size` is always >= 1
/// - Every key has exactly `ngram_size` tokens
/// - No key maps to an empty state
/// - A prefix only seen at the very end of the stream is absent
///
/// The model is never mutated by a walk: one instance can serve any number
/// of concurrent generations by shared reference.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarkovModel {
	/// Number of tokens per prefix
	ngram_size: usize,

	/// Mapping from a prefix to the successors observed after it.
	/// Ordered, so that start candidates come out in a stable order.
	states: BTreeMap<Prefix, State>,
}

impl MarkovModel {
	/// Creates an empty model of the given order.
	///
	/// # Errors
	/// Returns [`Error::InvalidNgramSize`] if `ngram_size < 1`.
	pub fn new(ngram_size: usize) -> Result<Self> {
		if ngram_size < 1 {
			return Err(Error::InvalidNgramSize(ngram_size));
		}
		Ok(Self { ngram_size, states: BTreeMap::new() })
	}

	/// Builds the frequency table of `tokens`.
	///
	/// Given the tokens `[a b c a b x]` and an `ngram_size` of 2, the result is:
	/// ```text
	/// [a b]: [c:1, x:1]
	/// [b c]: [a:1]
	/// [c a]: [b:1]
	/// ```
	///
	/// A stream shorter than `ngram_size + 1` tokens yields an empty model.
	///
	/// # Errors
	/// Returns [`Error::InvalidNgramSize`] if `ngram_size < 1`.
	pub fn build<S: AsRef<str>>(tokens: &[S], ngram_size: usize) -> Result<Self> {
		let mut model = Self::new(ngram_size)?;

		// windows() never yields the trailing partial windows
		for window in tokens.windows(ngram_size + 1) {
			let (key, next) = window.split_at(ngram_size);
			let state = match model.states.entry(Prefix::new(key)) {
				Entry::Occupied(entry) => entry.into_mut(),
				Entry::Vacant(entry) => entry.insert(State::default()),
			};
			state.add_transition(next[0].as_ref());
		}

		debug!(
			"built {}-gram model: {} prefixes from {} tokens",
			ngram_size,
			model.len(),
			tokens.len()
		);
		Ok(model)
	}

	/// Returns the number of tokens per prefix.
	pub fn ngram_size(&self) -> usize {
		self.ngram_size
	}

	/// Returns the number of distinct prefixes.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// An empty model cannot generate anything.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Total number of windows recorded, across every prefix.
	pub fn observations(&self) -> usize {
		self.states.values().map(State::total).sum()
	}

	/// Returns the successors of `prefix`, or `None` when the prefix is a
	/// terminal state.
	pub fn suffixes(&self, prefix: &Prefix) -> Option<&[SuffixFrequency]> {
		self.states.get(prefix).map(State::suffixes)
	}

	pub(crate) fn state(&self, prefix: &Prefix) -> Option<&State> {
		self.states.get(prefix)
	}

	/// Iterates over every prefix, in key order.
	pub fn prefixes(&self) -> impl Iterator<Item = &Prefix> {
		self.states.keys()
	}

	/// Returns every prefix whose first token satisfies `predicate`,
	/// in key order.
	pub fn start_candidates<P>(&self, predicate: P) -> Vec<&Prefix>
	where
		P: Fn(&str) -> bool,
	{
		self.states
			.keys()
			.filter(|prefix| prefix.first().is_some_and(&predicate))
			.collect()
	}

	/// Picks a starting prefix uniformly among the start candidates.
	///
	/// # Errors
	/// Returns [`Error::NoValidStart`] when no prefix satisfies `predicate`,
	/// which includes the empty model.
	pub fn pick_start<R, P>(&self, rng: &mut R, predicate: P) -> Result<Prefix>
	where
		R: RandomRange + ?Sized,
		P: Fn(&str) -> bool,
	{
		let candidates = self.start_candidates(predicate);
		if candidates.is_empty() {
			return Err(Error::NoValidStart);
		}
		let index = rng.range(0, candidates.len());
		let start = candidates.get(index).or(candidates.last()).ok_or(Error::NoValidStart)?;
		Ok((*start).clone())
	}

	/// Starts a lazy random walk from a prefix chosen by [`Self::pick_start`].
	///
	/// The returned iterator may never end; bound it with `take` when the
	/// corpus contains cycles.
	///
	/// # Errors
	/// Returns [`Error::NoValidStart`] when no prefix satisfies `predicate`.
	pub fn generate<R, P>(&self, mut rng: R, predicate: P) -> Result<Walk<'_, R>>
	where
		R: RandomRange,
		P: Fn(&str) -> bool,
	{
		let start = self.pick_start(&mut rng, predicate)?;
		Ok(Walk::new(self, start, rng))
	}

	/// Merges another model into this one.
	///
	/// # Notes
	/// - Both models must have the same `ngram_size`.
	/// - Counts of shared prefixes and successors are summed.
	///
	/// # Errors
	/// Returns [`Error::NgramSizeMismatch`] if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.ngram_size != other.ngram_size {
			return Err(Error::NgramSizeMismatch { expected: self.ngram_size, found: other.ngram_size });
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state);
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}

	/// Writes the model to `path` in `postcard` binary form.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Reads a model written by [`Self::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}

/// Start predicate of the reference corpus: the token begins with an
/// uppercase letter, which is how names and sentences start.
pub fn starts_uppercase(token: &str) -> bool {
	token.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::random::Scripted;

	fn tokens(text: &str) -> Vec<&str> {
		text.split_whitespace().collect()
	}

	fn counts(model: &MarkovModel, key: &[&str]) -> Vec<(String, usize)> {
		model
			.suffixes(&Prefix::new(key))
			.unwrap_or_default()
			.iter()
			.map(|entry| (entry.suffix.clone(), entry.frequency))
			.collect()
	}

	#[test]
	fn test_reference_table() {
		let model = MarkovModel::build(&tokens("A B C A B X"), 2).unwrap();

		assert_eq!(model.len(), 3);
		assert_eq!(counts(&model, &["A", "B"]), vec![("C".to_owned(), 1), ("X".to_owned(), 1)]);
		assert_eq!(counts(&model, &["B", "C"]), vec![("A".to_owned(), 1)]);
		assert_eq!(counts(&model, &["C", "A"]), vec![("B".to_owned(), 1)]);
		// only seen at the end of the stream
		assert!(model.suffixes(&Prefix::new(&["B", "X"])).is_none());
	}

	#[test]
	fn test_zero_ngram_size_rejected() {
		let result = MarkovModel::build(&tokens("a b c"), 0);
		assert!(matches!(result, Err(Error::InvalidNgramSize(0))));
	}

	#[test]
	fn test_short_corpus_gives_empty_model() {
		let empty: Vec<&str> = Vec::new();
		assert!(MarkovModel::build(&empty, 1).unwrap().is_empty());
		assert!(MarkovModel::build(&tokens("a b"), 2).unwrap().is_empty());
		assert!(MarkovModel::build(&tokens("a b c"), 3).unwrap().is_empty());
		assert_eq!(MarkovModel::build(&tokens("a b c"), 2).unwrap().len(), 1);
	}

	#[test]
	fn test_window_count() {
		let stream = tokens("the cat sat on the mat and the cat ran off");
		for n in 1..=stream.len() + 1 {
			let model = MarkovModel::build(&stream, n).unwrap();
			assert_eq!(model.observations(), stream.len().saturating_sub(n), "n = {n}");
		}
	}

	#[test]
	fn test_frequency_sums_match_occurrences() {
		let stream = tokens("a b a b a c a b b a b a");
		let n = 2;
		let model = MarkovModel::build(&stream, n).unwrap();

		for prefix in model.prefixes() {
			let expected = stream
				.windows(n + 1)
				.filter(|window| Prefix::new(&window[..n]) == *prefix)
				.count();
			let total: usize = model.suffixes(prefix).unwrap().iter().map(|e| e.frequency).sum();
			assert_eq!(total, expected, "prefix {prefix}");
			assert!(total > 0);
		}
	}

	#[test]
	fn test_every_key_has_ngram_size_tokens() {
		let model = MarkovModel::build(&tokens("one two three four five six"), 3).unwrap();
		assert!(model.prefixes().all(|prefix| prefix.len() == 3));
		assert_eq!(model.ngram_size(), 3);
	}

	#[test]
	fn test_start_candidates_follow_predicate() {
		let model = MarkovModel::build(&tokens("Alpha one two Beta three"), 2).unwrap();
		let candidates = model.start_candidates(starts_uppercase);
		// [Beta three] is never followed by a token, so it is not a key
		assert_eq!(candidates, vec![&Prefix::new(&["Alpha", "one"])]);
	}

	#[test]
	fn test_pick_start_uses_draw_as_index() {
		let model = MarkovModel::build(&tokens("Alpha one Beta two Gamma three x"), 2).unwrap();
		let mut rng = Scripted::new(&[1]);
		let start = model.pick_start(&mut rng, starts_uppercase).unwrap();
		assert_eq!(start, Prefix::new(&["Beta", "two"]));
		assert_eq!(rng.consumed(), 1);
	}

	#[test]
	fn test_no_valid_start() {
		let lower = MarkovModel::build(&tokens("a b c d"), 2).unwrap();
		assert!(matches!(
			lower.pick_start(&mut Scripted::default(), starts_uppercase),
			Err(Error::NoValidStart)
		));

		let empty = MarkovModel::build(&tokens("A"), 2).unwrap();
		assert!(matches!(empty.generate(Scripted::default(), |_: &str| true), Err(Error::NoValidStart)));
	}

	#[test]
	fn test_merge_models() {
		let mut left = MarkovModel::build(&tokens("A B C"), 2).unwrap();
		let right = MarkovModel::build(&tokens("A B D A B C"), 2).unwrap();
		left.merge(&right).unwrap();

		assert_eq!(counts(&left, &["A", "B"]), vec![("C".to_owned(), 2), ("D".to_owned(), 1)]);
		assert_eq!(counts(&left, &["D", "A"]), vec![("B".to_owned(), 1)]);
		assert_eq!(left.observations(), 1 + 4);
	}

	#[test]
	fn test_merge_rejects_other_order() {
		let mut left = MarkovModel::build(&tokens("a b c"), 2).unwrap();
		let right = MarkovModel::build(&tokens("a b c"), 1).unwrap();
		assert!(matches!(
			left.merge(&right),
			Err(Error::NgramSizeMismatch { expected: 2, found: 1 })
		));
	}

	#[test]
	fn test_save_and_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bin");
		let model = MarkovModel::build(&tokens("A B C A B X"), 2).unwrap();

		model.save(&path).unwrap();
		assert_eq!(MarkovModel::load(&path).unwrap(), model);
	}

	#[test]
	fn test_starts_uppercase() {
		assert!(starts_uppercase("React"));
		assert!(starts_uppercase("Élan"));
		assert!(!starts_uppercase("react"));
		assert!(!starts_uppercase("::"));
		assert!(!starts_uppercase(""));
	}
}
