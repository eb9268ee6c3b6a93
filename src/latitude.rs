//! Geomagnetic latitude binning of spectral models.

use crate::rng::RandomSource;
use crate::spectrum::SpectrumModel;
use std::f64::consts::PI;

/// Outcome of locating a geomagnetic latitude in the bin table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Below the first centre or at and above the last one.
    Single(usize),
    /// From the centre of `lower` up to the centre of `upper`. On the lower
    /// centre itself `r1` is zero: full weight, but the pick still spends a
    /// draw.
    ///
    /// `r1` is the distance to the lower centre, `r2` the distance to the
    /// upper centre, both in radians.
    Blend {
        lower: usize,
        upper: usize,
        r1: f64,
        r2: f64,
    },
}

impl Resolution {
    /// Normalised `(lower, upper)` weights of a blend.
    pub fn weights(&self) -> (f64, f64) {
        match *self {
            Resolution::Single(_) => (1.0, 0.0),
            Resolution::Blend { r1, r2, .. } => (r2 / (r1 + r2), r1 / (r1 + r2)),
        }
    }
}

/// Convert a latitude in degrees to the `|theta_M|` in radians used for binning.
pub fn binning_angle(latitude_deg: f64) -> f64 {
    latitude_deg.abs() * PI / 180.0
}

/// Ordered per-bin spectral models keyed by bin centre.
#[derive(Debug, Clone)]
pub struct LatitudeBinSelector {
    centres: Vec<f64>,
    models: Vec<SpectrumModel>,
}

impl LatitudeBinSelector {
    /// Centres are in radians and must be strictly increasing.
    pub fn new(bins: Vec<(f64, SpectrumModel)>) -> Self {
        assert!(!bins.is_empty(), "latitude table needs at least one bin");
        debug_assert!(
            bins.windows(2).all(|w| w[0].0 < w[1].0),
            "bin centres must increase"
        );
        let (centres, models) = bins.into_iter().unzip();
        Self { centres, models }
    }

    pub fn centres(&self) -> &[f64] {
        &self.centres
    }

    pub fn models(&self) -> &[SpectrumModel] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Locate `theta` (`|theta_M|` in radians).
    pub fn resolve(&self, theta: f64) -> Resolution {
        let last = self.centres.len() - 1;
        if theta < self.centres[0] {
            return Resolution::Single(0);
        }
        for i in 0..last {
            let (lo, hi) = (self.centres[i], self.centres[i + 1]);
            if theta >= lo && theta < hi {
                return Resolution::Blend {
                    lower: i,
                    upper: i + 1,
                    r1: theta - lo,
                    r2: hi - theta,
                };
            }
        }
        Resolution::Single(last)
    }

    /// Model an energy is drawn from. A blend spends one deviate.
    pub fn pick<R: RandomSource + ?Sized>(&self, theta: f64, rng: &mut R) -> &SpectrumModel {
        match self.resolve(theta) {
            Resolution::Single(i) => &self.models[i],
            Resolution::Blend {
                lower,
                upper,
                r1,
                r2,
            } => {
                if rng.flat() * (r1 + r2) < r2 {
                    &self.models[lower]
                } else {
                    &self.models[upper]
                }
            }
        }
    }

    pub fn sample_energy<R: RandomSource + ?Sized>(&self, theta: f64, rng: &mut R) -> f64 {
        self.pick(theta, rng).sample(rng)
    }

    /// Downward flux blended linearly between the neighbouring bins.
    pub fn downward_flux(&self, theta: f64) -> f64 {
        match self.resolve(theta) {
            Resolution::Single(i) => self.models[i].downward_flux(),
            Resolution::Blend {
                lower,
                upper,
                r1,
                r2,
            } => {
                (r2 * self.models[lower].downward_flux() + r1 * self.models[upper].downward_flux())
                    / (r1 + r2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;
    use crate::spectrum::{DownwardFlux, Segment};

    fn flat_model(lo: f64, hi: f64, flux: f64) -> SpectrumModel {
        SpectrumModel::new(
            vec![Segment::power_law(lo, hi, 1.0, 0.0)],
            DownwardFlux::Fixed(flux),
        )
    }

    fn selector() -> LatitudeBinSelector {
        LatitudeBinSelector::new(vec![
            (0.1, flat_model(1.0, 2.0, 10.0)),
            (0.3, flat_model(3.0, 4.0, 30.0)),
            (0.5, flat_model(5.0, 6.0, 50.0)),
        ])
    }

    #[test]
    fn test_resolve_edges_clamp() {
        let s = selector();
        assert_eq!(s.resolve(0.0), Resolution::Single(0));
        assert_eq!(s.resolve(0.5), Resolution::Single(2));
        assert_eq!(s.resolve(1.4), Resolution::Single(2));
    }

    #[test]
    fn test_resolve_at_centre_gives_full_weight() {
        let s = selector();
        let r = s.resolve(0.3);
        assert!(matches!(r, Resolution::Blend { lower: 1, upper: 2, .. }));
        assert_eq!(r.weights(), (1.0, 0.0));
        assert!((s.downward_flux(0.3) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_centre_blends_and_spends_a_draw() {
        let s = selector();
        let r = s.resolve(0.1);
        assert_eq!(
            r,
            Resolution::Blend {
                lower: 0,
                upper: 1,
                r1: 0.0,
                r2: 0.3 - 0.1
            }
        );
        assert_eq!(r.weights(), (1.0, 0.0));
        let mut seq = SequenceSource::new(vec![0.999, 0.5]);
        let e = s.sample_energy(0.1, &mut seq);
        assert!((1.0..2.0).contains(&e));
        // bin pick, segment choice and inversion
        assert_eq!(seq.draws(), 3);
    }

    #[test]
    fn test_flux_blend_is_linear() {
        let s = selector();
        let flux = s.downward_flux(0.15);
        assert!((flux - 15.0).abs() < 1e-12);
        let (wl, wu) = s.resolve(0.15).weights();
        assert!((wl - 0.75).abs() < 1e-12);
        assert!((wu - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_pick_follows_distance_rule() {
        let s = selector();
        // 0.15 sits a quarter of the way from 0.1 to 0.3: u < 0.75 picks the lower bin
        let mut low = SequenceSource::new(vec![0.7, 0.5]);
        let e = s.sample_energy(0.15, &mut low);
        assert!((1.0..2.0).contains(&e));
        let mut high = SequenceSource::new(vec![0.8, 0.5]);
        let e = s.sample_energy(0.15, &mut high);
        assert!((3.0..4.0).contains(&e));
    }

    #[test]
    fn test_single_bin_spends_no_selection_draw() {
        let s = selector();
        let mut seq = SequenceSource::new(vec![0.5]);
        s.sample_energy(0.01, &mut seq);
        // segment choice plus inversion
        assert_eq!(seq.draws(), 2);
    }

    #[test]
    fn test_binning_angle_uses_absolute_latitude() {
        assert_eq!(binning_angle(-30.0), binning_angle(30.0));
        assert!((binning_angle(180.0) - PI).abs() < 1e-15);
    }
}
