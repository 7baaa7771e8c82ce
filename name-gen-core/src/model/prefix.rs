use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-length window of consecutive tokens, used as a model key.
///
/// Equality, ordering and hashing are structural: two prefixes built from
/// the same tokens are the same key, whichever corpus they came from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(Vec<String>);

impl Prefix {
	/// Builds a prefix from a window of tokens.
	pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
		Self(tokens.iter().map(|t| t.as_ref().to_owned()).collect())
	}

	/// Number of tokens in the window (the model's n-gram size).
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Oldest token of the window.
	pub fn first(&self) -> Option<&str> {
		self.0.first().map(String::as_str)
	}

	pub fn tokens(&self) -> &[String] {
		&self.0
	}

	/// Slides the window forward: drops the oldest token, appends `next`
	/// and returns the dropped token.
	///
	/// Only the walker mutates a prefix, and only the one it owns.
	pub(crate) fn shift(&mut self, next: String) -> String {
		self.0.push(next);
		self.0.remove(0)
	}

	pub(crate) fn into_tokens(self) -> Vec<String> {
		self.0
	}
}

impl fmt::Display for Prefix {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}]", self.0.join(" "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn test_value_equality_as_key() {
		let mut map = HashMap::new();
		map.insert(Prefix::new(&["a", "b"]), 1);

		let owned = vec!["a".to_owned(), "b".to_owned()];
		assert_eq!(map.get(&Prefix::new(&owned)), Some(&1));
		assert_eq!(map.get(&Prefix::new(&["b", "a"])), None);
	}

	#[test]
	fn test_shift_slides_window() {
		let mut prefix = Prefix::new(&["a", "b", "c"]);
		let dropped = prefix.shift("d".to_owned());
		assert_eq!(dropped, "a");
		assert_eq!(prefix, Prefix::new(&["b", "c", "d"]));
		assert_eq!(prefix.len(), 3);
		assert_eq!(prefix.first(), Some("b"));
	}

	#[test]
	fn test_display() {
		assert_eq!(Prefix::new(&["One", "framework."]).to_string(), "[One framework.]");
	}
}
