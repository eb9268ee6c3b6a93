//! Uniform random sources consumed by the samplers.
//!
//! Every sampling call takes the source as an argument, so the host decides
//! which engine drives a generator and several generators can share one
//! stream or use separate ones.

use rand::RngCore;

/// A supplier of uniform deviates in `[0, 1)`.
pub trait RandomSource {
    fn flat(&mut self) -> f64;
}

impl<R: RngCore + ?Sized> RandomSource for R {
    #[inline]
    fn flat(&mut self) -> f64 {
        rand::Rng::gen::<f64>(self)
    }
}

/// Replays a fixed list of deviates, cycling when exhausted.
///
/// Useful for scripting exact draw sequences in tests and for replaying a
/// recorded stream.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    position: usize,
}

impl SequenceSource {
    /// Panics if `values` is empty.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "SequenceSource needs at least one value");
        Self { values, position: 0 }
    }

    /// Number of deviates handed out so far.
    pub fn draws(&self) -> usize {
        self.position
    }
}

impl RandomSource for SequenceSource {
    fn flat(&mut self) -> f64 {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}
