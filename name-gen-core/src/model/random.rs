use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed integers.
///
/// This is the only randomness the chain walker consumes: every draw is a
/// half-open range `[low, high)`. Keeping the seam this narrow lets tests
/// script the exact draws a walk receives.
///
/// Callers always pass `low < high`.
pub trait RandomRange {
	/// Returns an integer in `[low, high)`.
	fn range(&mut self, low: usize, high: usize) -> usize;
}

impl<R: RandomRange + ?Sized> RandomRange for &mut R {
	fn range(&mut self, low: usize, high: usize) -> usize {
		(**self).range(low, high)
	}
}

/// Adapter exposing any `rand` generator as a [`RandomRange`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
	pub fn new(rng: R) -> Self {
		Self(rng)
	}
}

impl RngSource<ThreadRng> {
	/// Thread-local generator, seeded by the OS.
	pub fn thread() -> Self {
		Self(rand::rng())
	}
}

impl RngSource<StdRng> {
	/// Deterministic generator: the same seed always replays the same walk.
	pub fn seeded(seed: u64) -> Self {
		Self(StdRng::seed_from_u64(seed))
	}
}

impl<R: Rng> RandomRange for RngSource<R> {
	fn range(&mut self, low: usize, high: usize) -> usize {
		self.0.random_range(low..high)
	}
}

/// [`RandomRange`] backed by a closure, see [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

impl<F: FnMut(usize, usize) -> usize> RandomRange for FromFn<F> {
	fn range(&mut self, low: usize, high: usize) -> usize {
		(self.0)(low, high)
	}
}

/// Wraps a closure `(low, high) -> value` as a [`RandomRange`].
///
/// ```
/// use name_gen_core::model::random::{from_fn, RandomRange};
///
/// let mut always_low = from_fn(|low, _high| low);
/// assert_eq!(always_low.range(3, 10), 3);
/// ```
pub fn from_fn<F: FnMut(usize, usize) -> usize>(f: F) -> FromFn<F> {
	FromFn(f)
}

/// Replays a fixed list of draws, then keeps returning `low`.
///
/// Draws are returned as-is: a script must only contain values that fit
/// the ranges it will be asked for.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
	draws: Vec<usize>,
	cursor: usize,
}

impl Scripted {
	pub fn new(draws: &[usize]) -> Self {
		Self { draws: draws.to_vec(), cursor: 0 }
	}

	/// Number of draws consumed so far.
	pub fn consumed(&self) -> usize {
		self.cursor
	}
}

impl RandomRange for Scripted {
	fn range(&mut self, low: usize, _high: usize) -> usize {
		match self.draws.get(self.cursor) {
			Some(draw) => {
				self.cursor += 1;
				*draw
			}
			None => low,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_seeded_source_is_reproducible() {
		let mut a = RngSource::seeded(42);
		let mut b = RngSource::seeded(42);
		let draws_a: Vec<usize> = (0..16).map(|_| a.range(0, 1000)).collect();
		let draws_b: Vec<usize> = (0..16).map(|_| b.range(0, 1000)).collect();
		assert_eq!(draws_a, draws_b);
	}

	#[test]
	fn test_draws_stay_in_range() {
		let mut rng = RngSource::thread();
		for _ in 0..200 {
			let value = rng.range(5, 8);
			assert!((5..8).contains(&value));
		}
	}

	fn draw_once<R: RandomRange>(mut rng: R, high: usize) -> usize {
		rng.range(0, high)
	}

	#[test]
	fn test_from_fn_through_mut_ref() {
		let mut calls = 0;
		let mut source = from_fn(|low, high| {
			calls += 1;
			high - 1 - low
		});
		assert_eq!(draw_once(&mut source, 4), 3);
		assert_eq!(draw_once(&mut source, 2), 1);
		drop(source);
		assert_eq!(calls, 2);
	}
}
