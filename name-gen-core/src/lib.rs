//! N-gram Markov chain name generation library.
//!
//! This crate provides:
//! - A token-level n-gram model built from any token stream
//! - Lazy weighted random walks with an injectable random source
//! - A corpus format and tokenizer for named entries (name + description)
//! - A high-level generator with model caching and duplicate avoidance
//!
//! ```
//! use name_gen_core::model::{MarkovModel, Scripted, starts_uppercase};
//!
//! let tokens = ["A", "B", "C", "A", "B", "X"];
//! let model = MarkovModel::build(&tokens, 2)?;
//! let walk = model.generate(Scripted::new(&[0, 0, 0, 0, 1]), starts_uppercase)?;
//! assert_eq!(walk.collect::<Vec<_>>(), ["A", "B", "C", "A", "B", "X"]);
//! # Ok::<(), name_gen_core::Error>(())
//! ```

/// Corpus loading, tokenization and rendering of generated entries.
pub mod corpus;

/// Error type shared by the whole crate.
pub mod error;

/// Core Markov models and generation logic.
pub mod model;

/// I/O utilities (file loading, path helpers).
///
/// Only directory listing is exposed.
pub mod io;

pub use error::{Error, Result};
