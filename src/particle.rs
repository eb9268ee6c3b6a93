use crate::angular::Direction;
use crate::component::ComponentKind;

/// One generated cosmic-ray particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub name: &'static str,
    pub component: ComponentKind,
    /// kinetic energy, GeV
    pub energy: f64,
    pub direction: Direction,
}

impl Particle {
    pub fn new(
        name: &'static str,
        component: ComponentKind,
        energy: f64,
        direction: Direction,
    ) -> Self {
        Self {
            name,
            component,
            energy,
            direction,
        }
    }

    /// Kinetic energy in MeV, the unit most detector simulations track.
    pub fn energy_mev(&self) -> f64 {
        self.energy * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_construction() {
        let p = Particle::new(
            "e+",
            ComponentKind::Splash,
            0.25,
            Direction::new(-0.5, 1.0),
        );
        assert_eq!(p.name, "e+");
        assert_eq!(p.component, ComponentKind::Splash);
        assert_eq!(p.energy_mev(), 250.0);
        assert_eq!(p.direction.cos_theta, -0.5);
    }
}
