use std::vec;

use serde::{Deserialize, Serialize};

use super::markov_model::MarkovModel;
use super::prefix::Prefix;
use super::random::RandomRange;

/// What a walk does once it reaches a prefix with no recorded successor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalkEnd {
	/// End right away: the tokens left in the window are discarded.
	Stop,
	/// Emit the tokens left in the window, then end.
	#[default]
	Flush,
}

enum Position {
	Walking(Prefix),
	Draining(vec::IntoIter<String>),
	Done,
}

/// Lazy random walk over a [`MarkovModel`].
///
/// Each call to `next` looks up the current prefix, samples a successor,
/// yields the oldest token of the window and slides the window forward.
/// The walk ends when the current prefix has no successor; it may also
/// never end if the chain cycles, so consumers bound it themselves.
///
/// The walk borrows the model and owns its window, so any number of walks
/// can run over one model at the same time.
pub struct Walk<'m, R> {
	model: &'m MarkovModel,
	rng: R,
	end: WalkEnd,
	position: Position,
}

impl<'m, R: RandomRange> Walk<'m, R> {
	/// Starts a walk at `start`, which must have the model's n-gram size.
	pub fn new(model: &'m MarkovModel, start: Prefix, rng: R) -> Self {
		Self { model, rng, end: WalkEnd::default(), position: Position::Walking(start) }
	}

	/// Sets the end-of-walk policy.
	pub fn with_end(mut self, end: WalkEnd) -> Self {
		self.end = end;
		self
	}

	/// Gives the random source back, e.g. to reuse it for another walk.
	pub fn into_rng(self) -> R {
		self.rng
	}
}

impl<R: RandomRange> Iterator for Walk<'_, R> {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		loop {
			match &mut self.position {
				Position::Walking(prefix) => {
					let Some(state) = self.model.state(prefix) else {
						// Terminal state: normal end of the walk
						let window = std::mem::replace(&mut self.position, Position::Done);
						if let (WalkEnd::Flush, Position::Walking(prefix)) = (self.end, window) {
							self.position = Position::Draining(prefix.into_tokens().into_iter());
						}
						continue;
					};
					let next = state.choose(&mut self.rng)?.to_owned();
					return Some(prefix.shift(next));
				}
				Position::Draining(rest) => {
					let token = rest.next();
					if token.is_none() {
						self.position = Position::Done;
					}
					return token;
				}
				Position::Done => return None,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use crate::model::markov_model::starts_uppercase;
	use crate::model::random::{RngSource, Scripted, from_fn};
	use std::collections::HashSet;

	fn tokens(text: &str) -> Vec<&str> {
		text.split_whitespace().collect()
	}

	fn walk(model: &MarkovModel, start: &[&str], draws: &[usize], end: WalkEnd) -> Vec<String> {
		Walk::new(model, Prefix::new(start), Scripted::new(draws)).with_end(end).take(100).collect()
	}

	#[test]
	fn test_reference_walk() {
		let model = MarkovModel::build(&tokens("A B C A B X"), 2).unwrap();

		// [A B] -> C, [B C] -> A, [C A] -> B, [A B] -> X, [B X] is terminal
		let draws = [0, 0, 0, 1];
		assert_eq!(walk(&model, &["A", "B"], &draws, WalkEnd::Stop), tokens("A B C A"));
		assert_eq!(walk(&model, &["A", "B"], &draws, WalkEnd::Flush), tokens("A B C A B X"));
	}

	#[test]
	fn test_generate_through_model() {
		let model = MarkovModel::build(&tokens("A B C A B X"), 2).unwrap();
		// first draw picks the start among [A B], [B C], [C A]
		let rng = Scripted::new(&[0, 0, 0, 0, 1]);
		let generated: Vec<String> = model.generate(rng, starts_uppercase).unwrap().collect();
		assert_eq!(generated, tokens("A B C A B X"));
	}

	#[test]
	fn test_terminal_start_emits_only_window() {
		let model = MarkovModel::build(&tokens("A B C"), 2).unwrap();
		assert!(walk(&model, &["B", "C"], &[], WalkEnd::Stop).is_empty());
		assert_eq!(walk(&model, &["B", "C"], &[], WalkEnd::Flush), tokens("B C"));
	}

	#[test]
	fn test_cycle_is_bounded_by_consumer() {
		let model = MarkovModel::build(&tokens("a b a b a"), 1).unwrap();
		let walk = Walk::new(&model, Prefix::new(&["a"]), from_fn(|low, _| low));
		let taken: Vec<String> = walk.take(6).collect();
		assert_eq!(taken, tokens("a b a b a b"));
	}

	#[test]
	fn test_scripted_walks_are_reproducible() {
		let model = MarkovModel::build(&tokens("A x y A y x A x x y Q"), 1).unwrap();
		let draws = [2, 1, 0, 1, 1, 0, 2, 1];
		let first = walk(&model, &["A"], &draws, WalkEnd::Flush);
		let second = walk(&model, &["A"], &draws, WalkEnd::Flush);
		assert_eq!(first, second);
		assert!(!first.is_empty());
	}

	#[test]
	fn test_seeded_walks_only_emit_corpus_tokens() {
		let corpus = tokens(
			"Angular One framework . Mobile and desktop . React A library for building user interfaces . \
			 Vue A progressive framework for building user interfaces .",
		);
		let known: HashSet<&str> = corpus.iter().copied().collect();

		for n in 1..=3 {
			let model = MarkovModel::build(&corpus, n).unwrap();
			for seed in 0..20 {
				let generated: Vec<String> = model
					.generate(RngSource::seeded(seed), starts_uppercase)
					.unwrap()
					.take(200)
					.collect();
				assert!(!generated.is_empty());
				assert!(starts_uppercase(&generated[0]));
				assert!(generated.iter().all(|token| known.contains(token.as_str())));

				let replay: Vec<String> = model
					.generate(RngSource::seeded(seed), starts_uppercase)
					.unwrap()
					.take(200)
					.collect();
				assert_eq!(generated, replay);
			}
		}
	}

	#[test]
	fn test_empty_model_cannot_start() {
		let model = MarkovModel::build(&tokens("A B"), 2).unwrap();
		assert!(matches!(model.generate(Scripted::default(), starts_uppercase), Err(Error::NoValidStart)));
	}

	#[test]
	fn test_walk_returns_rng() {
		let model = MarkovModel::build(&tokens("A B C"), 1).unwrap();
		let mut walk = Walk::new(&model, Prefix::new(&["A"]), Scripted::new(&[0, 0]));
		assert_eq!(walk.next().as_deref(), Some("A"));
		assert_eq!(walk.into_rng().consumed(), 1);
	}
}
