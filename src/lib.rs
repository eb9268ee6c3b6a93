//! Cosmic-ray particle spectra at satellite orbit.
//!
//! Each [`SpeciesGenerator`] mixes primary, reentrant and splash components
//! in proportion to their flux and draws one particle per call: a kinetic
//! energy in GeV and an arrival direction. Spectra depend on the
//! geomagnetic latitude, the cutoff rigidity and the solar-wind potential,
//! all updated through the position setters.

pub mod angular;
pub mod component;
pub mod config;
pub mod coordinate;
pub mod data;
pub mod error;
pub mod latitude;
pub mod orbit;
pub mod particle;
pub mod primary;
pub mod rng;
pub mod species;
pub mod spectrum;
mod utilities;

pub use angular::{AngularModel, Direction};
pub use component::{ComponentGenerator, ComponentKind, ComponentSpectrum};
pub use config::{Config, GeneratorParams};
pub use coordinate::{CoordinateTransform, DipoleTransform, LowLatitudeGrid};
pub use error::{CrError, CrResult};
pub use latitude::{LatitudeBinSelector, Resolution};
pub use orbit::OrbitState;
pub use particle::Particle;
pub use primary::{PrimaryBounds, PrimarySpectrum};
pub use rng::{RandomSource, SequenceSource};
pub use species::{Species, SpeciesGenerator};
pub use spectrum::{DownwardFlux, Segment, Shape, SpectrumModel};
pub use utilities::{integrate_log_simpson, interpolate_linear};
