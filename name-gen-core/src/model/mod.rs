//! Top-level module for the Markov chain generation system.
//!
//! This module provides:
//! - Prefix keys and per-prefix successor counts (`Prefix`, `State`)
//! - The frequency table and its builder (`MarkovModel`)
//! - Lazy random walks over the table (`Walk`)
//! - The injected randomness seam (`RandomRange`)
//! - Generation configuration (`GenerationInput`)
//! - A high-level generation interface (`Generator`)

/// High-level interface for generating named entries from one or more corpora.
///
/// Exposes corpus loading, model caching, and entry generation with
/// retries and duplicate avoidance.
pub mod generator;

/// Per-request generation parameters and start seed strategies.
pub mod generation_input;

/// N-gram frequency table over string tokens.
///
/// Handles the build from a token stream, start selection, merging and
/// binary persistence.
pub mod markov_model;

/// Fixed-length token window used as a model key.
pub mod prefix;

/// Narrow randomness interface and its implementations.
pub mod random;

/// Successor counts of a single prefix.
///
/// Supports weighted random sampling with integer arithmetic.
pub mod state;

/// Lazy random walk over a model.
pub mod walker;

pub use generation_input::{GenerationInput, StartSeed};
pub use generator::Generator;
pub use markov_model::{MarkovModel, starts_uppercase};
pub use prefix::Prefix;
pub use random::{RandomRange, RngSource, Scripted, from_fn};
pub use state::SuffixFrequency;
pub use walker::{Walk, WalkEnd};
