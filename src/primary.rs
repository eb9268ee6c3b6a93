//! Primary (galactic) cosmic-ray spectrum at orbit.
//!
//! The interstellar spectrum `A * R^-a` is modulated with the force-field
//! approximation (Gleeson & Axford 1968) and attenuated by a smooth
//! geomagnetic cutoff `1 / (1 + (R / R_c)^-12)`. Energies are kinetic in
//! GeV, rigidities in GV, potentials in MV, the spectrum is per MeV.

use crate::data::{
    ELECTRON_REST_ENERGY, PROTON_FLUX_CUTOFFS, PROTON_FLUX_INTEGRAL, PROTON_FLUX_POTENTIALS,
    PROTON_REST_ENERGY,
};
use crate::rng::RandomSource;
use crate::spectrum::PER_MEV_TO_PER_GEV;
use crate::utilities::{integrate_log_simpson, interpolate_bilinear};

/// Upper edge of the generated primary spectrum in GeV.
pub const PRIMARY_HIGH_ENERGY: f64 = 100.0;

const CUTOFF_SHARPNESS: f64 = 12.0;
/// Floor on the cutoff rigidity so the energy bounds stay ordered near the
/// geomagnetic poles.
pub const MIN_CUTOFF_RIGIDITY: f64 = 0.05;
const FLUX_QUADRATURE_INTERVALS: usize = 2000;

/// Where the energy-integrated downward flux comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimaryFlux {
    /// Bilinear lookup in the tabulated proton integrals.
    ProtonTable,
    /// Numerical integration of the modulated, cut spectrum.
    Integrated,
}

/// Energy bounds and flux derived from the current cutoff and potential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryBounds {
    pub cutoff_rigidity: f64,
    pub solar_wind_potential: f64,
    /// energy at `cor / 2.5`, where the flux is taken as zero
    pub low: f64,
    /// energy at the cutoff rigidity
    pub cut: f64,
    pub high: f64,
    /// vertically downward flux integrated over `[low, high]`, c/s/m^2/sr
    pub downward_flux: f64,
}

/// Analytic primary spectrum for one particle species.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimarySpectrum {
    rest_energy: f64,
    norm: f64,
    index: f64,
    flux: PrimaryFlux,
}

impl PrimarySpectrum {
    pub fn new(rest_energy: f64, norm: f64, index: f64, flux: PrimaryFlux) -> Self {
        Self {
            rest_energy,
            norm,
            index,
            flux,
        }
    }

    /// AMS proton fit (Alcaraz et al. 2000).
    pub fn proton() -> Self {
        Self::new(PROTON_REST_ENERGY, 23.9, 2.83, PrimaryFlux::ProtonTable)
    }

    /// Galactic electrons. Placeholder fit with no upstream table.
    pub fn electron() -> Self {
        Self::new(ELECTRON_REST_ENERGY, 0.3, 3.3, PrimaryFlux::Integrated)
    }

    /// Galactic positrons. Placeholder fit with no upstream table, sharing
    /// the electron index.
    pub fn positron() -> Self {
        Self::new(ELECTRON_REST_ENERGY, 0.02, 3.3, PrimaryFlux::Integrated)
    }

    pub fn rest_energy(&self) -> f64 {
        self.rest_energy
    }

    pub fn flux_source(&self) -> PrimaryFlux {
        self.flux
    }

    /// Rigidity in GV of a singly charged particle with kinetic energy `e`.
    pub fn rigidity(&self, e: f64) -> f64 {
        ((e + self.rest_energy).powi(2) - self.rest_energy.powi(2)).sqrt()
    }

    /// Kinetic energy in GeV at `rigidity`.
    pub fn energy(&self, rigidity: f64) -> f64 {
        (rigidity.powi(2) + self.rest_energy.powi(2)).sqrt() - self.rest_energy
    }

    /// Interstellar spectrum.
    pub fn unmodulated(&self, e: f64) -> f64 {
        self.norm * self.rigidity(e).powf(-self.index)
    }

    /// Force-field modulated spectrum for potential `phi` in MV.
    pub fn modulated(&self, e: f64, phi: f64) -> f64 {
        let shift = phi * 1e-3;
        let m = self.rest_energy;
        self.unmodulated(e + shift) * ((e + m).powi(2) - m.powi(2))
            / ((e + m + shift).powi(2) - m.powi(2))
    }

    pub fn geomagnetic_cut(&self, e: f64, cor: f64) -> f64 {
        1.0 / (1.0 + (self.rigidity(e) / cor).powf(-CUTOFF_SHARPNESS))
    }

    /// Spectrum at orbit, c/s/m^2/sr/MeV.
    pub fn value(&self, e: f64, cor: f64, phi: f64) -> f64 {
        self.modulated(e, phi) * self.geomagnetic_cut(e, cor)
    }

    /// Recompute the energy bounds and downward flux for a new cutoff
    /// rigidity `cor` (GV) or solar-wind potential `phi` (MV).
    pub fn bounds(&self, cor: f64, phi: f64) -> PrimaryBounds {
        let cor = cor.max(MIN_CUTOFF_RIGIDITY);
        let low = self.energy(cor / 2.5);
        let cut = self.energy(cor);
        let high = PRIMARY_HIGH_ENERGY;
        let downward_flux = match self.flux {
            PrimaryFlux::ProtonTable => proton_flux_integral(cor, phi),
            PrimaryFlux::Integrated => {
                PER_MEV_TO_PER_GEV
                    * integrate_log_simpson(
                        |e| self.value(e, cor, phi),
                        low,
                        high,
                        FLUX_QUADRATURE_INTERVALS,
                    )
            }
        };
        PrimaryBounds {
            cutoff_rigidity: cor,
            solar_wind_potential: phi,
            low,
            cut,
            high,
            downward_flux,
        }
    }

    /// Linear envelope between `low` and `cut`.
    fn envelope_below(&self, e: f64, b: &PrimaryBounds) -> f64 {
        let (cor, phi) = (b.cutoff_rigidity, b.solar_wind_potential);
        let at_low = self.value(b.low, cor, phi);
        let slope = (self.value(b.cut, cor, phi) - at_low) / (b.cut - b.low);
        slope * (e - b.low) + at_low
    }

    fn envelope_below_integral(&self, e: f64, b: &PrimaryBounds) -> f64 {
        let (cor, phi) = (b.cutoff_rigidity, b.solar_wind_potential);
        let at_low = self.value(b.low, cor, phi);
        let slope = (self.value(b.cut, cor, phi) - at_low) / (b.cut - b.low);
        0.5 * slope * (e - b.low).powi(2) + at_low * (e - b.low)
    }

    /// Interstellar power law in kinetic energy, used above `cut`.
    fn envelope_above(&self, e: f64) -> f64 {
        self.norm * e.powf(-self.index)
    }

    fn envelope_above_integral(&self, e: f64) -> f64 {
        self.norm / (-self.index + 1.0) * e.powf(-self.index + 1.0)
    }

    fn envelope_above_integral_inv(&self, value: f64) -> f64 {
        ((-self.index + 1.0) / self.norm * value).powf(1.0 / (-self.index + 1.0))
    }

    /// Draw a kinetic energy in GeV.
    pub fn sample<R: RandomSource + ?Sized>(&self, b: &PrimaryBounds, rng: &mut R) -> f64 {
        let (cor, phi) = (b.cutoff_rigidity, b.solar_wind_potential);
        let below_area =
            self.envelope_below_integral(b.cut, b) - self.envelope_below_integral(b.low, b);
        let above_min = self.envelope_above_integral(b.cut);
        let above_area = self.envelope_above_integral(b.high) - above_min;

        loop {
            if rng.flat() <= below_area / (below_area + above_area) {
                // triangular draw, the flux at `low` is taken as zero
                let e1 = rng.flat() * (b.cut - b.low) + b.low;
                let e2 = rng.flat() * (b.cut - b.low) + b.low;
                let e = e1.max(e2);
                if rng.flat() <= self.value(e, cor, phi) / self.envelope_below(e, b) {
                    return e;
                }
            } else {
                let r = rng.flat() * above_area + above_min;
                let e = self.envelope_above_integral_inv(r);
                if rng.flat() <= self.value(e, cor, phi) / self.envelope_above(e) {
                    return e;
                }
            }
        }
    }
}

/// Tabulated downward proton flux, clamped to 0.5-14.9 GV and 500-1100 MV.
pub fn proton_flux_integral(cor: f64, phi: f64) -> f64 {
    let cor = cor.clamp(0.5, 14.9);
    let phi = phi.clamp(500.0, 1100.0);
    interpolate_bilinear(
        &PROTON_FLUX_CUTOFFS,
        &PROTON_FLUX_POTENTIALS,
        &PROTON_FLUX_INTEGRAL,
        cor,
        phi,
    )
}
