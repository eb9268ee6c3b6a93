//! Static spectral tables for the cosmic-ray generators.
//!
//! Energies are kinetic energies in GeV and normalisations are per MeV at
//! 1 GeV unless a pivot energy is given. Latitude bin centres are
//! `|theta_M|` in radians.

use crate::latitude::LatitudeBinSelector;
use crate::spectrum::{DownwardFlux, Segment, SpectrumModel};

/// Electron rest energy in GeV.
pub const ELECTRON_REST_ENERGY: f64 = 5.11e-4;
/// Proton rest energy in GeV.
pub const PROTON_REST_ENERGY: f64 = 0.938;

/// Energy range of the secondary e+- tables measured at LAT altitude.
pub const LAT_LEPTON_LOW_ENERGY: f64 = 0.01;
pub const LAT_LEPTON_HIGH_ENERGY: f64 = 10.0;

/// Energy range of the AMS reentrant positron tables.
pub const AMS_POSITRON_LOW_ENERGY: f64 = 0.01;
pub const AMS_POSITRON_HIGH_ENERGY: f64 = 20.0;

/// Broken power-law term quoted as `coefficient * (E / pivot)^-index`
/// with `pivot` in MeV.
#[derive(Debug, Clone, Copy)]
pub struct PivotTerm {
    pub coefficient: f64,
    pub pivot_mev: f64,
    pub index: f64,
}

const fn term(coefficient: f64, pivot_mev: f64, index: f64) -> PivotTerm {
    PivotTerm {
        coefficient,
        pivot_mev,
        index,
    }
}

/// One latitude bin of the combined secondary e+- spectrum.
#[derive(Debug, Clone, Copy)]
pub struct LeptonBin {
    pub name: &'static str,
    pub centre: f64,
    /// secondary e+/e- ratio in the bin
    pub positron_to_electron: f64,
    pub terms: &'static [PivotTerm],
    /// energies where one term hands over to the next
    pub breaks: &'static [f64],
}

/// Secondary e+- spectra in the 0.0-1.1 rad geomagnetic band, one bin per
/// 0.1 rad with the last bin covering 0.6-1.1 rad.
pub const LAT_LEPTON_BINS: [LeptonBin; 7] = [
    LeptonBin {
        name: "0001",
        centre: 0.05,
        positron_to_electron: 4.8,
        terms: &[
            term(0.45, 100.0, 2.0),
            term(0.45, 100.0, 1.5),
            term(0.056, 400.0, 2.5),
            term(3.65e-4, 3000.0, 3.6),
        ],
        breaks: &[0.1, 0.4, 3.0],
    },
    LeptonBin {
        name: "0102",
        centre: 0.15,
        positron_to_electron: 4.2,
        terms: &[
            term(0.45, 100.0, 2.0),
            term(0.45, 100.0, 1.5),
            term(0.056, 400.0, 2.5),
            term(0.0056, 1000.0, 2.9),
        ],
        breaks: &[0.1, 0.4, 1.0],
    },
    LeptonBin {
        name: "0203",
        centre: 0.25,
        positron_to_electron: 3.8,
        terms: &[
            term(0.45, 100.0, 2.0),
            term(0.45, 100.0, 1.5),
            term(0.086, 300.0, 1.8),
            term(0.051, 400.0, 2.8),
        ],
        breaks: &[0.1, 0.3, 0.4],
    },
    LeptonBin {
        name: "0304",
        centre: 0.35,
        positron_to_electron: 2.6,
        terms: &[
            term(0.45, 100.0, 2.0),
            term(0.45, 100.0, 1.6),
            term(0.078, 300.0, 2.5),
            term(0.0137, 600.0, 2.8),
        ],
        breaks: &[0.1, 0.3, 0.6],
    },
    LeptonBin {
        name: "0405",
        centre: 0.45,
        positron_to_electron: 1.8,
        terms: &[
            term(0.5, 100.0, 2.0),
            term(0.5, 100.0, 1.7),
            term(0.077, 300.0, 2.8),
        ],
        breaks: &[0.1, 0.3],
    },
    LeptonBin {
        name: "0506",
        centre: 0.55,
        positron_to_electron: 1.0,
        terms: &[
            term(0.6, 100.0, 2.0),
            term(0.6, 100.0, 1.9),
            term(0.074, 300.0, 3.0),
            term(0.00059, 1500.0, 2.3),
        ],
        breaks: &[0.1, 0.3, 1.5],
    },
    LeptonBin {
        name: "0611",
        centre: 0.65,
        positron_to_electron: 1.0,
        terms: &[
            term(0.65, 100.0, 2.0),
            term(0.65, 100.0, 1.9),
            term(0.08, 300.0, 3.2),
            term(9e-4, 1200.0, 1.8),
        ],
        breaks: &[0.1, 0.3, 1.2],
    },
];

/// Which share of the combined e+- spectrum a table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeptonCharge {
    Electron,
    Positron,
}

impl LeptonBin {
    /// Spectral model for one charge, flux integrated from the segments.
    pub fn model(&self, charge: LeptonCharge) -> SpectrumModel {
        let ratio = self.positron_to_electron;
        let mut edges = Vec::with_capacity(self.breaks.len() + 2);
        edges.push(LAT_LEPTON_LOW_ENERGY);
        edges.extend_from_slice(self.breaks);
        edges.push(LAT_LEPTON_HIGH_ENERGY);

        let segments = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let base = t.coefficient * (1000.0 / t.pivot_mev).powf(-t.index);
                let norm = match charge {
                    LeptonCharge::Electron => base / (1.0 + ratio),
                    LeptonCharge::Positron => base * ratio / (1.0 + ratio),
                };
                Segment::power_law(edges[i], edges[i + 1], norm, t.index)
            })
            .collect();
        SpectrumModel::new(segments, DownwardFlux::Integrated)
    }
}

/// Latitude table of the secondary e+- spectrum for one charge.
pub fn lat_lepton_table(charge: LeptonCharge) -> LatitudeBinSelector {
    LatitudeBinSelector::new(
        LAT_LEPTON_BINS
            .iter()
            .map(|bin| (bin.centre, bin.model(charge)))
            .collect(),
    )
}

/// Reentrant positron spectra measured by AMS, six bins in 0.0-1.1 rad.
///
/// Below 0.1 GeV every bin is a single `E^-1` term. The downward fluxes are
/// the published integrals and are kept as quoted.
pub fn ams_positron_reentrant_table() -> LatitudeBinSelector {
    let lo = AMS_POSITRON_LOW_ENERGY;
    let hi = AMS_POSITRON_HIGH_ENERGY;
    let bins = vec![
        // 0.0-0.3 rad
        (
            0.15,
            SpectrumModel::new(
                vec![
                    Segment::power_law(lo, 0.1, 9.8e-2, 1.0),
                    Segment::exp_cutoff(0.1, hi, 1.02e-2, 2.0, 2.5),
                ],
                DownwardFlux::Fixed(311.0),
            ),
        ),
        // 0.3-0.6 rad
        (
            0.45,
            SpectrumModel::new(
                vec![
                    Segment::power_law(lo, 0.1, 5.03e-2, 1.0),
                    Segment::power_law(0.1, hi, 1.18e-3, 2.63),
                ],
                DownwardFlux::Fixed(146.69),
            ),
        ),
        // 0.6-0.8 rad, rising cutoff term on top of the power law
        (
            0.7,
            SpectrumModel::new(
                vec![
                    Segment::power_law(lo, 0.1, 2.61e-2, 1.0),
                    Segment::power_law(0.1, hi, 2.12e-4, 3.09),
                    Segment::stretched_cutoff(0.1, hi, 3.0e-4, -1.0, 2.0),
                ],
                DownwardFlux::Fixed(73.15),
            ),
        ),
        // 0.8-0.9 rad
        (
            0.85,
            SpectrumModel::new(
                vec![
                    Segment::power_law(lo, 0.1, 2.59e-2, 1.0),
                    Segment::power_law(0.1, hi, 1.33e-4, 3.29),
                    Segment::stretched_cutoff(0.1, hi, 1.6e-3, -2.0, 1.6),
                ],
                DownwardFlux::Fixed(73.13),
            ),
        ),
        // 0.9-1.0 rad
        (
            0.95,
            SpectrumModel::new(
                vec![
                    Segment::power_law(lo, 0.1, 4.09e-2, 1.0),
                    Segment::power_law(0.1, 0.3, 3.82e-4, 3.03),
                    Segment::exp_cutoff(0.3, hi, 5.55e-3, 1.0, 1.3),
                ],
                DownwardFlux::Fixed(120.73),
            ),
        ),
        // 1.0-1.1 rad
        (
            1.05,
            SpectrumModel::new(
                vec![
                    Segment::power_law(lo, 0.1, 6.60e-2, 1.0),
                    Segment::power_law(0.1, hi, 9.11e-4, 2.86),
                ],
                DownwardFlux::Fixed(187.45),
            ),
        ),
    ];
    LatitudeBinSelector::new(bins)
}

/// Rigidity cutoff grid (GV) of [`PROTON_FLUX_INTEGRAL`].
pub const PROTON_FLUX_CUTOFFS: [f64; 16] = [
    0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0,
];

/// Solar-wind potential grid (MV) of [`PROTON_FLUX_INTEGRAL`].
pub const PROTON_FLUX_POTENTIALS: [f64; 7] = [500.0, 600.0, 700.0, 800.0, 900.0, 1000.0, 1100.0];

/// Downward primary proton flux (c/s/m^2/sr) integrated from `E(cor / 2.5)`
/// to 100 GeV, tabulated over cutoff rigidity and solar-wind potential.
pub const PROTON_FLUX_INTEGRAL: [[f64; 7]; 16] = [
    [3817.0, 3083.0, 2549.0, 2147.0, 1836.0, 1589.0, 1390.0],
    [3077.0, 2575.0, 2188.0, 1883.0, 1638.0, 1438.0, 1272.0],
    [1744.0, 1546.0, 1380.0, 1239.0, 1118.0, 1013.0, 922.2],
    [1069.0, 978.3, 898.3, 827.4, 764.3, 707.9, 657.3],
    [717.6, 669.1, 625.1, 585.2, 548.7, 515.5, 485.0],
    [515.1, 486.1, 459.4, 434.8, 411.9, 390.8, 371.1],
    [388.2, 369.5, 352.0, 335.7, 320.5, 306.2, 292.8],
    [303.4, 290.6, 278.6, 267.3, 256.5, 246.4, 236.9],
    [243.9, 234.8, 226.1, 217.9, 210.1, 202.7, 195.6],
    [200.5, 193.8, 187.3, 181.2, 175.3, 169.7, 164.3],
    [167.9, 162.7, 157.8, 153.1, 148.5, 144.2, 140.0],
    [142.7, 138.6, 134.8, 131.1, 127.5, 124.0, 120.7],
    [122.8, 119.6, 116.5, 113.5, 110.6, 107.9, 105.2],
    [106.8, 104.2, 101.7, 99.3, 96.9, 94.6, 92.5],
    [93.7, 91.6, 89.5, 87.5, 85.6, 83.7, 81.9],
    [82.9, 81.2, 79.4, 77.8, 76.2, 74.6, 73.1],
];
