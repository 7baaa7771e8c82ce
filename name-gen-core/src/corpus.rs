//! Corpus of named entries and its token stream.
//!
//! A corpus file (`.dat`) holds one entry per line, the name and the
//! description separated by a tab:
//!
//! ```text
//! # frameworks
//! Angular	One framework. Mobile and desktop.
//! Koa	Next generation JavaScript framework for Node.js.
//! ```
//!
//! Entries are flattened into a single token stream, with sentinel tokens
//! marking where a name ends and where an entry ends, so that a generated
//! walk can be cut back into a name and a description.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::{get_filename, read_file};

/// Token placed between the words of a name and the words of its description.
pub const NAME_SEPARATOR: &str = "::";

/// Token placed after the last word of a description.
pub const ENTRY_END: &str = "<end>";

/// A named example: a name and its one-line description.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Entry {
	pub name: String,
	pub description: String,
}

impl Entry {
	pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
		Self { name: name.into(), description: description.into() }
	}

	/// Parses one corpus line.
	///
	/// Returns `None` for blank lines and `#` comments. A line without a
	/// tab is a name without description.
	pub fn parse(line: &str) -> Option<Self> {
		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			return None;
		}
		let (name, description) = line.split_once('\t').unwrap_or((line, ""));
		let name = name.trim();
		if name.is_empty() {
			return None;
		}
		Some(Self::new(name, description.trim()))
	}

	/// Appends the tokens of this entry to `tokens`.
	fn tokenize_into(&self, tokens: &mut Vec<String>) {
		tokens.extend(self.name.split_whitespace().map(str::to_owned));
		tokens.push(NAME_SEPARATOR.to_owned());
		tokens.extend(self.description.split_whitespace().map(str::to_owned));
		tokens.push(ENTRY_END.to_owned());
	}
}

/// A named list of entries, usually loaded from a `.dat` file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
	name: String,
	entries: Vec<Entry>,
}

impl Corpus {
	pub fn new(name: impl Into<String>, entries: Vec<Entry>) -> Self {
		Self { name: name.into(), entries }
	}

	/// Parses every line of a corpus file.
	pub fn from_lines<I, S>(name: impl Into<String>, lines: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let entries = lines.into_iter().filter_map(|line| Entry::parse(line.as_ref())).collect();
		Self::new(name, entries)
	}

	/// Loads a corpus file; the corpus is named after the file stem.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let name = get_filename(&path)?;
		let lines = read_file(&path)?;
		Ok(Self::from_lines(name, lines))
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Flattens every entry into one token stream.
	///
	/// `Angular` / `One framework.` becomes
	/// `["Angular", "::", "One", "framework.", "<end>"]`.
	pub fn tokens(&self) -> Vec<String> {
		let mut tokens = Vec::new();
		for entry in &self.entries {
			entry.tokenize_into(&mut tokens);
		}
		tokens
	}
}

/// An entry cut out of a generated token stream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GeneratedEntry {
	pub name: String,
	pub description: String,
}

impl GeneratedEntry {
	/// Reads one entry from a token stream.
	///
	/// Name words are collected up to [`NAME_SEPARATOR`], then description
	/// words up to [`ENTRY_END`] or the end of the stream. An [`ENTRY_END`]
	/// met before any separator means the stream started inside a
	/// description: what was collected is dropped and reading restarts on
	/// the next entry.
	///
	/// Returns `None` when the stream ends before a non-empty name and a
	/// non-empty description were read.
	pub fn from_tokens<I, S>(tokens: I) -> Option<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut tokens = tokens.into_iter();
		let mut name: Vec<String> = Vec::new();

		loop {
			let token = tokens.next()?;
			match token.as_ref() {
				NAME_SEPARATOR => break,
				ENTRY_END => name.clear(),
				word => name.push(word.to_owned()),
			}
		}

		let mut description: Vec<String> = Vec::new();
		for token in tokens {
			match token.as_ref() {
				ENTRY_END => break,
				// a second separator means the end marker was lost
				NAME_SEPARATOR => break,
				word => description.push(word.to_owned()),
			}
		}

		if name.is_empty() || description.is_empty() {
			return None;
		}
		Some(Self { name: name.join(" "), description: description.join(" ") })
	}
}
