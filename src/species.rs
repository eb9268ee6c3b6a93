//! Per-species entry points used by the host event loop.

use crate::angular::Direction;
use crate::component::{ComponentGenerator, ComponentKind};
use crate::config::{Config, GeneratorParams};
use crate::coordinate::{CoordinateTransform, DipoleTransform, LowLatitudeGrid};
use crate::error::{CrError, CrResult};
use crate::orbit::OrbitState;
use crate::particle::Particle;
use crate::rng::RandomSource;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Cosmic-ray species with component models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Electron,
    Positron,
    Proton,
}

impl Species {
    pub fn particle_name(self) -> &'static str {
        match self {
            Species::Electron => "e-",
            Species::Positron => "e+",
            Species::Proton => "proton",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Species::Electron => "CrElectron",
            Species::Positron => "CrPositron",
            Species::Proton => "CrProton",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Species {
    type Err = CrError;

    /// Accepts the source title (`CrElectron`), the particle name (`e-`) or
    /// the plain species name (`electron`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crelectron" | "electron" | "e-" => Ok(Species::Electron),
            "crpositron" | "positron" | "e+" => Ok(Species::Positron),
            "crproton" | "proton" | "p" => Ok(Species::Proton),
            _ => Err(CrError::UnknownSpecies(s.to_string())),
        }
    }
}

/// Flux-weighted mixture of the active components of one species.
#[derive(Debug)]
pub struct SpeciesGenerator {
    species: Species,
    components: Vec<ComponentGenerator>,
    selected: Option<usize>,
    transform: Box<dyn CoordinateTransform>,
    orbit: Option<OrbitState>,
}

impl SpeciesGenerator {
    /// Build the generator from a parameter string such as `"5"` or `"7,0.8"`.
    ///
    /// Uses the dipole transform, refined by the low-latitude grid when
    /// [`Config::low_latitude_grid`] names one.
    pub fn new(species: Species, params: &str) -> CrResult<Self> {
        let grid_path = Config::global().low_latitude_grid.clone();
        let transform = match grid_path {
            Some(path) => DipoleTransform::with_grid(LowLatitudeGrid::from_json_file(path)?),
            None => DipoleTransform::default(),
        };
        Self::with_transform(species, params, Box::new(transform))
    }

    pub fn with_transform(
        species: Species,
        params: &str,
        transform: Box<dyn CoordinateTransform>,
    ) -> CrResult<Self> {
        let params = GeneratorParams::parse(params);
        let mut components = Vec::new();
        for kind in ComponentKind::ALL {
            if !params.includes(kind) {
                continue;
            }
            match ComponentGenerator::new(species, kind) {
                Some(mut component) => {
                    if let Some(normalization) = params.normalization {
                        component.set_normalization(normalization);
                    }
                    components.push(component);
                }
                None => log::warn!("{} has no {} component, ignoring it", species, kind.name()),
            }
        }
        if components.is_empty() {
            return Err(CrError::NoActiveComponents {
                species: species.to_string(),
            });
        }
        log::debug!(
            "{} built with components {:?}",
            species,
            components.iter().map(|c| c.kind()).collect::<Vec<_>>()
        );
        Ok(Self {
            species,
            components,
            selected: None,
            transform,
            orbit: None,
        })
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn components(&self) -> &[ComponentGenerator] {
        &self.components
    }

    /// Component chosen by the last selection.
    pub fn selected(&self) -> Option<&ComponentGenerator> {
        self.selected.map(|i| &self.components[i])
    }

    pub fn orbit(&self) -> Option<&OrbitState> {
        self.orbit.as_ref()
    }

    pub fn particle_name(&self) -> &'static str {
        self.species.particle_name()
    }

    pub fn title(&self) -> &'static str {
        self.species.title()
    }

    /// Relative weight of each component in the mixture.
    fn weights(&self) -> CrResult<Vec<f64>> {
        let several = self.components.len() > 1;
        self.components
            .iter()
            .map(|c| {
                let flux = checked_flux(c)?;
                Ok(if several { flux * c.solid_angle() } else { flux })
            })
            .collect()
    }

    /// Pick a component in proportion to its weight and remember it.
    pub fn select_component<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> CrResult<&ComponentGenerator> {
        let weights = self.weights()?;
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut running = 0.0;
        for w in weights {
            running += w;
            cumulative.push(running);
        }
        let u = rng.flat() * running;
        let index = cumulative
            .iter()
            .position(|&c| c >= u)
            .unwrap_or(self.components.len() - 1);
        self.selected = Some(index);
        Ok(&self.components[index])
    }

    /// Select a component and draw a kinetic energy (GeV) from it.
    pub fn energy<R: RandomSource + ?Sized>(&mut self, _time: f64, rng: &mut R) -> CrResult<f64> {
        self.select_component(rng)?;
        let index = self.selected.unwrap_or(0);
        self.components[index].energy_src(rng)
    }

    /// Draw a direction from the last selected component, selecting one
    /// first if none has been chosen yet.
    pub fn dir<R: RandomSource + ?Sized>(
        &mut self,
        energy: f64,
        rng: &mut R,
    ) -> CrResult<Direction> {
        let index = match self.selected {
            Some(index) => index,
            None => {
                self.select_component(rng)?;
                self.selected.unwrap_or(0)
            }
        };
        Ok(self.components[index].dir(energy, rng))
    }

    /// Flux in c/s/m^2/sr. With several components this is the
    /// solid-angle weighted sum over 4 pi sr.
    pub fn flux(&self, _time: f64) -> CrResult<f64> {
        if let [only] = self.components.as_slice() {
            return checked_flux(only);
        }
        let mut total = 0.0;
        for c in &self.components {
            total += checked_flux(c)? * c.solid_angle();
        }
        Ok(total / (4.0 * PI))
    }

    /// Solid angle of the mixture in sr.
    pub fn solid_angle(&self) -> f64 {
        match self.components.as_slice() {
            [only] => only.solid_angle(),
            _ => 4.0 * PI,
        }
    }

    /// The host derives arrival times from [`SpeciesGenerator::flux`].
    pub fn interval(&self, _time: f64) -> f64 {
        -1.0
    }

    /// One event: energy then direction from the same component.
    pub fn generate<R: RandomSource + ?Sized>(
        &mut self,
        time: f64,
        rng: &mut R,
    ) -> CrResult<Particle> {
        let energy = self.energy(time, rng)?;
        let direction = self.dir(energy, rng)?;
        let kind = self
            .selected()
            .map(|c| c.kind())
            .unwrap_or(ComponentKind::Primary);
        Ok(Particle::new(
            self.particle_name(),
            kind,
            energy,
            direction,
        ))
    }

    /// Move to a geographic position, keeping the current time and altitude.
    pub fn set_position(&mut self, latitude: f64, longitude: f64) {
        let time = self.orbit.map(|o| o.time).unwrap_or(0.0);
        self.set_position_at(latitude, longitude, time);
    }

    /// Move to a geographic position at `time`, keeping the current altitude.
    pub fn set_position_at(&mut self, latitude: f64, longitude: f64, time: f64) {
        let altitude = match self.orbit {
            Some(o) => o.altitude,
            None => Config::global().default_altitude_km,
        };
        self.set_position_full(latitude, longitude, time, altitude);
    }

    /// Move to a geographic position (degrees) at `time` (s) and `altitude` (km).
    ///
    /// Recomputes the geomagnetic coordinates and the dipole cutoff
    /// rigidity, which replaces any earlier explicit cutoff.
    pub fn set_position_full(&mut self, latitude: f64, longitude: f64, time: f64, altitude: f64) {
        let (default_potential, earth_radius) = {
            let config = Config::global();
            (config.default_solar_wind_potential_mv, config.earth_radius_km)
        };
        let potential = self
            .orbit
            .map(|o| o.solar_wind_potential)
            .unwrap_or(default_potential);
        let orbit = OrbitState::locate(
            self.transform.as_ref(),
            latitude,
            longitude,
            time,
            altitude,
            potential,
            earth_radius,
        );
        self.apply_orbit(orbit);
    }

    /// Override the cutoff rigidity (GV) until the next position update.
    pub fn set_cutoff_rigidity(&mut self, cutoff_rigidity: f64) -> CrResult<()> {
        let mut orbit = self.orbit.ok_or(CrError::PositionNotSet)?;
        orbit.cutoff_rigidity = cutoff_rigidity;
        self.apply_orbit(orbit);
        Ok(())
    }

    /// Set the solar-wind potential (MV) used by the primary components.
    pub fn set_solar_wind_potential(&mut self, potential: f64) -> CrResult<()> {
        let mut orbit = self.orbit.ok_or(CrError::PositionNotSet)?;
        orbit.solar_wind_potential = potential;
        self.apply_orbit(orbit);
        Ok(())
    }

    fn apply_orbit(&mut self, orbit: OrbitState) {
        self.orbit = Some(orbit);
        for component in &mut self.components {
            component.set_orbit(orbit);
        }
    }
}

fn checked_flux(component: &ComponentGenerator) -> CrResult<f64> {
    let flux = component.flux()?;
    if flux.is_finite() && flux >= 0.0 {
        Ok(flux)
    } else {
        log::warn!("{} flux {} is unusable", component.title(), flux);
        Err(CrError::InvalidFlux {
            component: component.title(),
            flux,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_species_from_str() {
        assert_eq!("CrElectron".parse::<Species>().unwrap(), Species::Electron);
        assert_eq!("e+".parse::<Species>().unwrap(), Species::Positron);
        assert_eq!(" proton ".parse::<Species>().unwrap(), Species::Proton);
        assert!(matches!(
            "CrGamma".parse::<Species>(),
            Err(CrError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_mask_selects_components_in_order() {
        let g = SpeciesGenerator::new(Species::Electron, "5").unwrap();
        let kinds: Vec<_> = g.components().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![ComponentKind::Primary, ComponentKind::Splash]);

        let g = SpeciesGenerator::new(Species::Positron, "").unwrap();
        assert_eq!(g.components().len(), 3);
    }

    #[test]
    fn test_normalization_applies_to_all_components() {
        let g = SpeciesGenerator::new(Species::Electron, "0,0.25").unwrap();
        assert!(g.components().iter().all(|c| c.normalization() == 0.25));
    }

    #[test]
    fn test_proton_ignores_missing_components() {
        let g = SpeciesGenerator::new(Species::Proton, "7").unwrap();
        assert_eq!(g.components().len(), 1);
        assert!(matches!(
            SpeciesGenerator::new(Species::Proton, "6"),
            Err(CrError::NoActiveComponents { .. })
        ));
    }

    #[test]
    fn test_sampling_before_position_fails() {
        let mut g = SpeciesGenerator::new(Species::Electron, "").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(g.energy(0.0, &mut rng), Err(CrError::PositionNotSet)));
        assert!(matches!(g.flux(0.0), Err(CrError::PositionNotSet)));
        assert!(g.set_cutoff_rigidity(4.0).is_err());
    }

    #[test]
    fn test_single_component_flux_and_solid_angle() {
        let mut g = SpeciesGenerator::new(Species::Electron, "2").unwrap();
        g.set_position(0.0, 0.0);
        assert_eq!(g.solid_angle(), 2.0 * PI);
        assert_eq!(g.flux(0.0).unwrap(), g.components()[0].flux().unwrap());
        assert_eq!(g.interval(0.0), -1.0);
    }

    #[test]
    fn test_mixture_flux_is_solid_angle_weighted() {
        let mut g = SpeciesGenerator::new(Species::Electron, "5").unwrap();
        g.set_position(10.0, 30.0);
        let expected: f64 = g
            .components()
            .iter()
            .map(|c| c.flux().unwrap() * c.solid_angle())
            .sum::<f64>()
            / (4.0 * PI);
        assert!((g.flux(0.0).unwrap() - expected).abs() < 1e-9);
        assert_eq!(g.solid_angle(), 4.0 * PI);
    }

    #[test]
    fn test_selection_edges_with_step_rng() {
        let mut g = SpeciesGenerator::new(Species::Electron, "").unwrap();
        g.set_position(0.0, 0.0);
        // StepRng(0, 0) always yields 0.0: the first component wins
        let mut zero = StepRng::new(0, 0);
        assert_eq!(g.select_component(&mut zero).unwrap().kind(), ComponentKind::Primary);
        // all ones is just below 1.0: the last component wins
        let mut top = StepRng::new(u64::MAX, 0);
        assert_eq!(g.select_component(&mut top).unwrap().kind(), ComponentKind::Splash);
        assert_eq!(g.selected().unwrap().kind(), ComponentKind::Splash);
    }

    #[test]
    fn test_dir_without_selection_selects_implicitly() {
        let mut g = SpeciesGenerator::new(Species::Positron, "").unwrap();
        g.set_position(-20.0, 100.0);
        assert!(g.selected().is_none());
        let mut rng = StdRng::seed_from_u64(9);
        g.dir(1.0, &mut rng).unwrap();
        assert!(g.selected().is_some());
    }

    #[test]
    fn test_direction_matches_selected_component() {
        let mut g = SpeciesGenerator::new(Species::Electron, "").unwrap();
        g.set_position(5.0, 5.0);
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..500 {
            let p = g.generate(0.0, &mut rng).unwrap();
            match p.component {
                ComponentKind::Splash => assert!(p.direction.cos_theta <= 1e-12),
                _ => assert!(p.direction.cos_theta >= 0.0),
            }
            assert_eq!(p.name, "e-");
            assert!(p.energy > 0.0);
        }
    }

    #[test]
    fn test_position_updates_reach_components() {
        let mut g = SpeciesGenerator::new(Species::Proton, "").unwrap();
        g.set_position_full(0.0, 0.0, 10.0, 35.0);
        let orbit = *g.components()[0].orbit().unwrap();
        assert_eq!(orbit.altitude, 35.0);
        assert_eq!(orbit.time, 10.0);
        g.set_cutoff_rigidity(4.46).unwrap();
        assert_eq!(g.components()[0].orbit().unwrap().cutoff_rigidity, 4.46);
        // a later move keeps altitude and time but recomputes the cutoff
        g.set_position(40.0, 10.0);
        let moved = g.orbit().unwrap();
        assert_eq!(moved.altitude, 35.0);
        assert_eq!(moved.time, 10.0);
        assert!(moved.cutoff_rigidity != 4.46);
    }

    #[test]
    fn test_unusable_component_flux_is_an_error() {
        for bad in [f64::NAN, -1.0] {
            let mut g = SpeciesGenerator::new(Species::Electron, "").unwrap();
            g.set_position(0.0, 0.0);
            g.components[1].set_normalization(bad);
            let mut rng = StdRng::seed_from_u64(3);
            assert!(matches!(
                g.select_component(&mut rng),
                Err(CrError::InvalidFlux {
                    component: "CrElectronReentrant",
                    ..
                })
            ));
            assert!(matches!(g.flux(0.0), Err(CrError::InvalidFlux { .. })));
            assert!(g.generate(0.0, &mut rng).is_err());
        }
    }
}
