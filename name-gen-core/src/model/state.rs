use log::warn;
use serde::{Deserialize, Serialize};

use super::random::RandomRange;

/// One observed successor of a prefix and how often it was seen.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SuffixFrequency {
	pub suffix: String,
	pub frequency: usize,
}

/// Represents a state of the Markov chain.
///
/// A `State` holds every successor observed after one prefix, in the order
/// they were first observed. Conceptually, this is a node whose outgoing
/// edges are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate successor occurrences during the build
/// - Pick the next token using weighted random sampling
/// - Merge with the state of the same prefix from another model
///
/// ## Invariants
/// - A state stored in a model has at least one successor
/// - Each frequency is strictly positive
/// - A successor appears at most once
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	suffixes: Vec<SuffixFrequency>,
}

impl State {
	/// Records one occurrence of `suffix` after this state's prefix.
	///
	/// - If the successor already exists, its count is increased.
	/// - Otherwise, it is appended with an initial count of 1.
	pub(crate) fn add_transition(&mut self, suffix: &str) {
		self.add_occurrences(suffix, 1);
	}

	fn add_occurrences(&mut self, suffix: &str, count: usize) {
		match self.suffixes.iter_mut().find(|entry| entry.suffix == suffix) {
			Some(entry) => entry.frequency += count,
			None => self.suffixes.push(SuffixFrequency { suffix: suffix.to_owned(), frequency: count }),
		}
	}

	/// Observed successors, in first-observed order.
	pub fn suffixes(&self) -> &[SuffixFrequency] {
		&self.suffixes
	}

	/// Total number of observations recorded for this prefix.
	pub fn total(&self) -> usize {
		self.suffixes.iter().map(|entry| entry.frequency).sum()
	}

	/// Picks the next token using weighted random sampling.
	///
	/// A single draw `r` in `[0, total)` is taken, then entries are scanned
	/// in order: the first entry with `r < frequency` wins, otherwise its
	/// frequency is subtracted from `r`. Draws `0..f1` select the first
	/// entry, `f1..f1+f2` the second, and so on.
	///
	/// Returns `None` if the state has no successors.
	pub fn choose<R: RandomRange + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		let total = self.total();
		if total == 0 {
			return None;
		}

		let draw = rng.range(0, total);
		let mut r = draw;
		for entry in &self.suffixes {
			if r < entry.frequency {
				return Some(&entry.suffix);
			}
			r -= entry.frequency;
		}

		// Only reachable when the injected source ignores its bounds
		warn!("random draw {} out of range 0..{}, using last successor", draw, total);
		self.suffixes.last().map(|entry| entry.suffix.as_str())
	}

	/// Merges another state of the same prefix into this one.
	///
	/// Counts of shared successors are summed; new successors are appended
	/// after the existing ones.
	pub(crate) fn merge(&mut self, other: &Self) {
		for entry in &other.suffixes {
			self.add_occurrences(&entry.suffix, entry.frequency);
		}
	}
}
