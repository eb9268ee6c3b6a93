//! Piecewise analytic energy spectra and their samplers.
//!
//! A [`SpectrumModel`] is an ordered list of [`Segment`]s, each an analytic
//! shape over an energy domain `[lo, hi)` in GeV. Sampling first picks a
//! segment in proportion to its envelope integral, then inverts the
//! segment's closed-form cumulative integral. Shapes without a closed-form
//! inverse are sampled through their power-law envelope with rejection.
//!
//! Spectral coefficients are quoted per MeV while energies are in GeV, so
//! fluxes integrated from the shapes carry a factor of 1000.

use crate::rng::RandomSource;
use crate::utilities::integrate_log_simpson;

/// Conversion from per-MeV differential spectra to per-GeV integrals.
pub const PER_MEV_TO_PER_GEV: f64 = 1000.0;

const CUTOFF_QUADRATURE_INTERVALS: usize = 2000;

/// Analytic form of one spectral segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// `norm * E^-index`
    PowerLaw { norm: f64, index: f64 },
    /// `norm * E^-index * exp(-E / cutoff)`, sampled through the power-law envelope
    ExpCutoff { norm: f64, index: f64, cutoff: f64 },
    /// `norm * E^-index * exp(-(E / cutoff)^(1 - index))`, index must not be 1
    StretchedCutoff { norm: f64, index: f64, cutoff: f64 },
}

impl Shape {
    /// Differential spectrum at `energy`.
    pub fn value(&self, energy: f64) -> f64 {
        match *self {
            Shape::PowerLaw { norm, index } => norm * energy.powf(-index),
            Shape::ExpCutoff {
                norm,
                index,
                cutoff,
            } => norm * energy.powf(-index) * (-energy / cutoff).exp(),
            Shape::StretchedCutoff {
                norm,
                index,
                cutoff,
            } => norm * energy.powf(-index) * (-(energy / cutoff).powf(-index + 1.0)).exp(),
        }
    }

    /// Function the sampler draws from: the shape itself, or the power-law
    /// envelope for [`Shape::ExpCutoff`].
    pub fn envelope(&self, energy: f64) -> f64 {
        match *self {
            Shape::PowerLaw { norm, index } | Shape::ExpCutoff { norm, index, .. } => {
                norm * energy.powf(-index)
            }
            Shape::StretchedCutoff { .. } => self.value(energy),
        }
    }

    /// Antiderivative of the envelope.
    pub fn envelope_integral(&self, energy: f64) -> f64 {
        match *self {
            Shape::PowerLaw { norm, index } | Shape::ExpCutoff { norm, index, .. } => {
                if index == 1.0 {
                    norm * energy.ln()
                } else {
                    norm * energy.powf(-index + 1.0) / (-index + 1.0)
                }
            }
            Shape::StretchedCutoff {
                norm,
                index,
                cutoff,
            } => {
                norm * cutoff.powf(-index + 1.0) / (index - 1.0)
                    * (-(energy / cutoff).powf(-index + 1.0)).exp()
            }
        }
    }

    /// Inverse of [`Shape::envelope_integral`].
    pub fn envelope_integral_inv(&self, value: f64) -> f64 {
        match *self {
            Shape::PowerLaw { norm, index } | Shape::ExpCutoff { norm, index, .. } => {
                if index == 1.0 {
                    (value / norm).exp()
                } else {
                    ((-index + 1.0) * value / norm).powf(-1.0 / (index - 1.0))
                }
            }
            Shape::StretchedCutoff {
                norm,
                index,
                cutoff,
            } => {
                cutoff
                    * (-((index - 1.0) * value / (norm * cutoff.powf(-index + 1.0))).ln())
                        .powf(1.0 / (-index + 1.0))
            }
        }
    }

    pub fn needs_rejection(&self) -> bool {
        matches!(self, Shape::ExpCutoff { .. })
    }
}

/// One shape over the energy domain `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub lo: f64,
    pub hi: f64,
    pub shape: Shape,
}

impl Segment {
    pub fn new(lo: f64, hi: f64, shape: Shape) -> Self {
        Self { lo, hi, shape }
    }

    pub fn power_law(lo: f64, hi: f64, norm: f64, index: f64) -> Self {
        Self::new(lo, hi, Shape::PowerLaw { norm, index })
    }

    pub fn exp_cutoff(lo: f64, hi: f64, norm: f64, index: f64, cutoff: f64) -> Self {
        Self::new(
            lo,
            hi,
            Shape::ExpCutoff {
                norm,
                index,
                cutoff,
            },
        )
    }

    pub fn stretched_cutoff(lo: f64, hi: f64, norm: f64, index: f64, cutoff: f64) -> Self {
        Self::new(
            lo,
            hi,
            Shape::StretchedCutoff {
                norm,
                index,
                cutoff,
            },
        )
    }

    /// Integral of the true shape over the segment, per-MeV units.
    pub fn integral(&self) -> f64 {
        match self.shape {
            Shape::ExpCutoff { .. } => integrate_log_simpson(
                |e| self.shape.value(e),
                self.lo,
                self.hi,
                CUTOFF_QUADRATURE_INTERVALS,
            ),
            _ => self.shape.envelope_integral(self.hi) - self.shape.envelope_integral(self.lo),
        }
    }
}

/// How a model reports its downward flux.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DownwardFlux {
    /// `1000 * sum of segment integrals`
    Integrated,
    /// Literature value in c/s/m^2/sr, used as is.
    Fixed(f64),
}

#[derive(Debug, Clone, Copy)]
struct SegmentTable {
    rand_min: f64,
    area: f64,
    /// running envelope area up to and including this segment, over the total
    threshold: f64,
}

/// Immutable piecewise spectrum with a precomputed sampling table.
#[derive(Debug, Clone)]
pub struct SpectrumModel {
    segments: Vec<Segment>,
    tables: Vec<SegmentTable>,
    total_area: f64,
    downward_flux: f64,
}

impl SpectrumModel {
    /// Build a model from its segments. Panics if `segments` is empty.
    pub fn new(segments: Vec<Segment>, flux: DownwardFlux) -> Self {
        assert!(!segments.is_empty(), "a spectrum needs at least one segment");

        let mut tables = Vec::with_capacity(segments.len());
        let mut total_area = 0.0;
        for segment in &segments {
            let rand_min = segment.shape.envelope_integral(segment.lo);
            let rand_max = segment.shape.envelope_integral(segment.hi);
            let area = rand_max - rand_min;
            debug_assert!(area > 0.0, "segment {:?} has no envelope area", segment);
            total_area += area;
            tables.push(SegmentTable {
                rand_min,
                area,
                threshold: 0.0,
            });
        }
        let mut running = 0.0;
        for table in tables.iter_mut() {
            running += table.area;
            table.threshold = running / total_area;
        }

        let downward_flux = match flux {
            DownwardFlux::Fixed(value) => value,
            DownwardFlux::Integrated => {
                PER_MEV_TO_PER_GEV * segments.iter().map(Segment::integral).sum::<f64>()
            }
        };

        Self {
            segments,
            tables,
            total_area,
            downward_flux,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sum of the segments' envelope integrals, per-MeV units.
    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Fraction of the envelope area held by segment `index`.
    pub fn segment_fraction(&self, index: usize) -> f64 {
        self.tables[index].area / self.total_area
    }

    /// Vertically downward flux in c/s/m^2/sr.
    pub fn downward_flux(&self) -> f64 {
        self.downward_flux
    }

    pub fn low_energy(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.lo)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn high_energy(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.hi)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Differential spectrum at `energy`: the sum of every segment covering it.
    pub fn density(&self, energy: f64) -> f64 {
        self.segments
            .iter()
            .filter(|s| energy >= s.lo && energy < s.hi)
            .map(|s| s.shape.value(energy))
            .sum()
    }

    /// Integral of the true spectrum over `[lo, hi]`, per-MeV units.
    pub fn integral(&self, lo: f64, hi: f64) -> f64 {
        self.segments
            .iter()
            .map(|s| {
                let a = lo.max(s.lo);
                let b = hi.min(s.hi);
                if b <= a {
                    0.0
                } else {
                    Segment::new(a, b, s.shape).integral()
                }
            })
            .sum()
    }

    /// Segment picked by the uniform deviate `u`.
    pub fn select_segment(&self, u: f64) -> usize {
        self.tables
            .iter()
            .position(|t| u <= t.threshold)
            .unwrap_or(self.tables.len() - 1)
    }

    /// Draw a kinetic energy in GeV.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        loop {
            let index = self.select_segment(rng.flat());
            let segment = &self.segments[index];
            let table = &self.tables[index];
            let r = rng.flat() * table.area + table.rand_min;
            let energy = segment.shape.envelope_integral_inv(r);
            if !segment.shape.needs_rejection() {
                return energy;
            }
            if rng.flat() * segment.shape.envelope(energy) < segment.shape.value(energy) {
                return energy;
            }
        }
    }
}
