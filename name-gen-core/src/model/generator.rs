use std::collections::HashSet;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::generation_input::GenerationInput;
use super::markov_model::MarkovModel;
use super::random::RandomRange;
use super::walker::Walk;
use crate::corpus::{Corpus, GeneratedEntry};
use crate::error::{Error, Result};
use crate::io;

/// High-level generator of names and descriptions.
///
/// # Responsibilities
/// - Build (or load from cache) one model per corpus and merge them
/// - Remember every corpus name, to avoid handing them back as inventions
/// - Turn bounded walks into [`GeneratedEntry`] values, with retries
///
/// The generator is read-only once built: `predict` takes `&self`, so a
/// single instance can be shared between threads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Generator {
	model: MarkovModel,
	/// Lowercased names of every corpus entry.
	known_names: HashSet<String>,
	/// Names of the corpora merged into this generator.
	corpus_names: Vec<String>,
}

impl Generator {
	/// Creates an empty generator; it cannot predict until a corpus is merged.
	///
	/// # Errors
	/// Returns an error if `ngram_size < 1`.
	pub fn empty(ngram_size: usize) -> Result<Self> {
		Ok(Self { model: MarkovModel::new(ngram_size)?, known_names: HashSet::new(), corpus_names: Vec::new() })
	}

	/// Builds a generator from an in-memory corpus.
	pub fn new(corpus: &Corpus, ngram_size: usize) -> Result<Self> {
		let model = MarkovModel::build(&corpus.tokens(), ngram_size)?;
		let known_names = corpus.entries().iter().map(|entry| normalize_name(&entry.name)).collect();
		Ok(Self { model, known_names, corpus_names: vec![corpus.name().to_owned()] })
	}

	/// Loads a generator for a corpus file.
	///
	/// - If `<stem>.<ngram_size>.bin` exists next to the file, the binary
	///   is decoded with `postcard` instead of rebuilding the model.
	/// - Otherwise the corpus is read and tokenized, the model is built and
	///   the binary is written for the next load.
	///
	/// An unreadable binary is rebuilt; a cache that cannot be written is
	/// only logged.
	pub fn from_file<P: AsRef<Path>>(path: P, ngram_size: usize) -> Result<Self> {
		let cache_path = io::build_cache_path(&path, ngram_size)?;

		if cache_path.exists() {
			match Self::load(&cache_path) {
				Ok(generator) if generator.model.ngram_size() == ngram_size => {
					debug!("loaded cached model {}", cache_path.display());
					return Ok(generator);
				}
				Ok(_) => warn!("cached model {} has another ngram size, rebuilding", cache_path.display()),
				Err(e) => warn!("cached model {} is unreadable ({e}), rebuilding", cache_path.display()),
			}
		}

		let corpus = Corpus::from_file(&path)?;
		let generator = Self::new(&corpus, ngram_size)?;
		if let Err(e) = generator.save(&cache_path) {
			warn!("failed to cache model to {}: {e}", cache_path.display());
		}
		Ok(generator)
	}

	/// Loads and merges every corpus file listed in `paths`.
	pub fn from_files<I, P>(paths: I, ngram_size: usize) -> Result<Self>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut generator = Self::empty(ngram_size)?;
		for path in paths {
			generator.merge(&Self::from_file(path, ngram_size)?)?;
		}
		Ok(generator)
	}

	/// Creates a generator by loading all `.dat` corpora from a directory.
	///
	/// # Parameters
	/// - `dir`: Path to a directory containing corpus files.
	///   Both `"folder"` and `"folder/"` are accepted.
	///
	/// # Errors
	/// - Returns an error if the path is not a directory.
	/// - Returns an error if the directory holds no `.dat` file.
	/// - Returns an error if a corpus fails to load.
	///
	/// # Notes
	/// - Only files directly contained in the directory are loaded
	///   (subdirectories are ignored).
	pub fn from_directory<P: AsRef<Path>>(dir: P, ngram_size: usize) -> Result<Self> {
		let folder = io::normalize_folder(dir.as_ref());
		if !folder.is_dir() {
			return Err(Error::invalid_input(format!("Expected a directory, got: {}", folder.display())));
		}

		let files = io::list_files(&folder, "dat")?;
		if files.is_empty() {
			return Err(Error::invalid_input(format!("No .dat corpus in {}", folder.display())));
		}
		Self::from_files(files.iter().map(|file| folder.join(file)), ngram_size)
	}

	/// Merges another generator into this one.
	///
	/// # Errors
	/// Returns an error if the n-gram sizes differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		self.model.merge(&other.model)?;
		self.known_names.extend(other.known_names.iter().cloned());
		self.corpus_names.extend(other.corpus_names.iter().cloned());
		Ok(())
	}

	/// Returns the underlying model.
	pub fn model(&self) -> &MarkovModel {
		&self.model
	}

	/// Returns the names of the corpora merged into this generator.
	pub fn corpus_names(&self) -> &[String] {
		&self.corpus_names
	}

	/// Returns true if `name` is a corpus entry (case-insensitive, any
	/// run of whitespace counting as one space).
	pub fn is_known(&self, name: &str) -> bool {
		self.known_names.contains(&normalize_name(name))
	}

	/// Generates one entry, avoiding existing names if possible.
	///
	/// # Behavior
	/// - Runs one bounded walk and cuts it into an entry.
	/// - Retries up to `nb_try` times while the entry is incomplete or
	///   its name already exists in a corpus.
	/// - Returns the last complete attempt if every attempt was a duplicate.
	///
	/// # Errors
	/// - [`Error::NoValidStart`] if no prefix satisfies the start seed.
	/// - [`Error::GenerationFailed`] if no attempt was complete.
	pub fn predict<R: RandomRange + ?Sized>(&self, input: &GenerationInput, rng: &mut R) -> Result<GeneratedEntry> {
		let attempts = input.nb_try.saturating_add(1);
		let mut duplicate = None;

		for attempt in 1..=attempts {
			match self.internal_predict(input, rng)? {
				Some(entry) if !self.is_known(&entry.name) => return Ok(entry),
				Some(entry) => {
					debug!("attempt {attempt}/{attempts}: '{}' already exists", entry.name);
					duplicate = Some(entry);
				}
				None => debug!("attempt {attempt}/{attempts}: walk ended before a complete entry"),
			}
		}

		duplicate.ok_or(Error::GenerationFailed(attempts))
	}

	/// Runs one walk bounded by `max_tokens` and reads an entry from it.
	fn internal_predict<R: RandomRange + ?Sized>(
		&self,
		input: &GenerationInput,
		rng: &mut R,
	) -> Result<Option<GeneratedEntry>> {
		let start = self.model.pick_start(rng, |token| input.start_seed.accepts(token))?;
		let walk = Walk::new(&self.model, start, rng).with_end(input.walk_end);
		Ok(GeneratedEntry::from_tokens(walk.take(input.max_tokens())))
	}

	fn save(&self, path: &Path) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	fn load(path: &Path) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}

/// Lowercases `name` and joins its words with single spaces, the way a
/// generated name is rebuilt from its tokens.
fn normalize_name(name: &str) -> String {
	name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
