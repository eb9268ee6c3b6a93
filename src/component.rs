//! Per-population generators: primary, reentrant and splash.

use crate::angular::{AngularModel, Direction};
use crate::config::{PRIMARY_BIT, REENTRANT_BIT, SPLASH_BIT};
use crate::data::{ams_positron_reentrant_table, lat_lepton_table, LeptonCharge};
use crate::error::{CrError, CrResult};
use crate::latitude::LatitudeBinSelector;
use crate::orbit::OrbitState;
use crate::primary::{PrimaryBounds, PrimarySpectrum};
use crate::rng::RandomSource;
use crate::species::Species;

/// Population a component generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Galactic cosmic rays reaching orbit from above.
    Primary,
    /// Secondaries returning downward along field lines.
    Reentrant,
    /// Secondaries moving upward out of the atmosphere.
    Splash,
}

impl ComponentKind {
    /// Creation order inside a species generator.
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Primary,
        ComponentKind::Reentrant,
        ComponentKind::Splash,
    ];

    /// Bit of this component in a parameter-string mask.
    pub fn bit(self) -> i32 {
        match self {
            ComponentKind::Primary => PRIMARY_BIT,
            ComponentKind::Reentrant => REENTRANT_BIT,
            ComponentKind::Splash => SPLASH_BIT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Primary => "primary",
            ComponentKind::Reentrant => "reentrant",
            ComponentKind::Splash => "splash",
        }
    }
}

/// Energy model of a component.
#[derive(Debug, Clone)]
pub enum ComponentSpectrum {
    /// Secondary spectra tabulated in geomagnetic latitude bins.
    Binned(LatitudeBinSelector),
    /// Modulated primary spectrum, with bounds for the current cutoff.
    Primary {
        model: PrimarySpectrum,
        bounds: Option<PrimaryBounds>,
    },
}

#[derive(Debug, Clone)]
pub struct ComponentGenerator {
    species: Species,
    kind: ComponentKind,
    spectrum: ComponentSpectrum,
    angular: AngularModel,
    normalization: f64,
    orbit: Option<OrbitState>,
}

impl ComponentGenerator {
    /// Build the model for `kind` of `species`, or `None` when there is no
    /// model for that population.
    pub fn new(species: Species, kind: ComponentKind) -> Option<Self> {
        let (spectrum, angular) = match (species, kind) {
            (Species::Electron, ComponentKind::Primary) => (
                primary(PrimarySpectrum::electron()),
                AngularModel::DownwardIsotropic,
            ),
            (Species::Positron, ComponentKind::Primary) => (
                primary(PrimarySpectrum::positron()),
                AngularModel::DownwardIsotropic,
            ),
            (Species::Proton, ComponentKind::Primary) => (
                primary(PrimarySpectrum::proton()),
                AngularModel::DownwardIsotropic,
            ),
            // no significant up/down asymmetry at orbit, so reentrant and
            // splash electrons share one table
            (Species::Electron, ComponentKind::Reentrant) => (
                ComponentSpectrum::Binned(lat_lepton_table(LeptonCharge::Electron)),
                AngularModel::DownwardIsotropic,
            ),
            (Species::Electron, ComponentKind::Splash) => (
                ComponentSpectrum::Binned(lat_lepton_table(LeptonCharge::Electron)),
                AngularModel::UpwardIsotropic,
            ),
            (Species::Positron, ComponentKind::Reentrant) => (
                ComponentSpectrum::Binned(ams_positron_reentrant_table()),
                AngularModel::zenith_weighted(),
            ),
            (Species::Positron, ComponentKind::Splash) => (
                ComponentSpectrum::Binned(lat_lepton_table(LeptonCharge::Positron)),
                AngularModel::UpwardIsotropic,
            ),
            (Species::Proton, ComponentKind::Reentrant | ComponentKind::Splash) => return None,
        };
        Some(Self {
            species,
            kind,
            spectrum,
            angular,
            normalization: 1.0,
            orbit: None,
        })
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn spectrum(&self) -> &ComponentSpectrum {
        &self.spectrum
    }

    pub fn angular(&self) -> AngularModel {
        self.angular
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    pub fn set_normalization(&mut self, normalization: f64) {
        self.normalization = normalization;
    }

    pub fn orbit(&self) -> Option<&OrbitState> {
        self.orbit.as_ref()
    }

    /// Move the component and refresh everything that depends on the cutoff.
    pub fn set_orbit(&mut self, orbit: OrbitState) {
        self.orbit = Some(orbit);
        self.refresh_bounds();
    }

    pub fn set_cutoff_rigidity(&mut self, cutoff_rigidity: f64) -> CrResult<()> {
        let orbit = self.orbit.as_mut().ok_or(CrError::PositionNotSet)?;
        orbit.cutoff_rigidity = cutoff_rigidity;
        self.refresh_bounds();
        Ok(())
    }

    pub fn set_solar_wind_potential(&mut self, potential: f64) -> CrResult<()> {
        let orbit = self.orbit.as_mut().ok_or(CrError::PositionNotSet)?;
        orbit.solar_wind_potential = potential;
        self.refresh_bounds();
        Ok(())
    }

    fn refresh_bounds(&mut self) {
        if let (ComponentSpectrum::Primary { model, bounds }, Some(orbit)) =
            (&mut self.spectrum, &self.orbit)
        {
            let refreshed = model.bounds(orbit.cutoff_rigidity, orbit.solar_wind_potential);
            log::trace!(
                "{} primary bounds {:.4}..{:.4}..{} GeV",
                self.species,
                refreshed.low,
                refreshed.cut,
                refreshed.high
            );
            *bounds = Some(refreshed);
        }
    }

    fn require_orbit(&self) -> CrResult<&OrbitState> {
        self.orbit.as_ref().ok_or(CrError::PositionNotSet)
    }

    /// Draw a kinetic energy in GeV at the current position.
    pub fn energy_src<R: RandomSource + ?Sized>(&self, rng: &mut R) -> CrResult<f64> {
        let orbit = self.require_orbit()?;
        match &self.spectrum {
            ComponentSpectrum::Binned(table) => {
                Ok(table.sample_energy(orbit.binning_angle(), rng))
            }
            ComponentSpectrum::Primary { model, bounds } => {
                let bounds = bounds.as_ref().ok_or(CrError::PositionNotSet)?;
                Ok(model.sample(bounds, rng))
            }
        }
    }

    /// Draw an arrival direction. The energy does not enter any of the
    /// current angular models.
    pub fn dir<R: RandomSource + ?Sized>(&self, _energy: f64, rng: &mut R) -> Direction {
        self.angular.sample(rng)
    }

    /// Energy-integrated flux in c/s/m^2/sr at the current position.
    ///
    /// Secondary components report the flux averaged over their hemisphere.
    /// The primary component reports the vertical flux over 4 pi sr, half of
    /// the tabulated downward integral.
    pub fn flux(&self) -> CrResult<f64> {
        let orbit = self.require_orbit()?;
        let flux = match &self.spectrum {
            ComponentSpectrum::Binned(table) => {
                table.downward_flux(orbit.binning_angle()) * self.angular.mean_flux_factor()
            }
            ComponentSpectrum::Primary { bounds, .. } => {
                let bounds = bounds.as_ref().ok_or(CrError::PositionNotSet)?;
                0.5 * bounds.downward_flux
            }
        };
        Ok(self.normalization * flux)
    }

    /// Solid angle the particles come from, sr.
    pub fn solid_angle(&self) -> f64 {
        self.angular.solid_angle()
    }

    pub fn particle_name(&self) -> &'static str {
        self.species.particle_name()
    }

    pub fn title(&self) -> &'static str {
        match (self.species, self.kind) {
            (Species::Electron, ComponentKind::Primary) => "CrElectronPrimary",
            (Species::Electron, ComponentKind::Reentrant) => "CrElectronReentrant",
            (Species::Electron, ComponentKind::Splash) => "CrElectronSplash",
            (Species::Positron, ComponentKind::Primary) => "CrPositronPrimary",
            (Species::Positron, ComponentKind::Reentrant) => "CrPositronReentrant",
            (Species::Positron, ComponentKind::Splash) => "CrPositronSplash",
            (Species::Proton, ComponentKind::Primary) => "CrProtonPrimary",
            (Species::Proton, ComponentKind::Reentrant) => "CrProtonReentrant",
            (Species::Proton, ComponentKind::Splash) => "CrProtonSplash",
        }
    }
}

fn primary(model: PrimarySpectrum) -> ComponentSpectrum {
    ComponentSpectrum::Primary {
        model,
        bounds: None,
    }
}
