use crate::rng::RandomSource;
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Arrival direction of a particle.
///
/// `cos_theta > 0` means the particle moves downward (comes from the
/// zenith). `phi = 0` is a particle arriving along the x-axis from `x > 0`,
/// `phi = pi/2` along the y-axis from `y > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub cos_theta: f64,
    pub phi: f64,
}

impl Direction {
    pub fn new(cos_theta: f64, phi: f64) -> Self {
        Self { cos_theta, phi }
    }

    /// Unit vector pointing toward where the particle came from, z up.
    pub fn source_vector(&self) -> Vector3<f64> {
        let sin_theta = (1.0 - self.cos_theta * self.cos_theta).max(0.0).sqrt();
        Vector3::new(
            sin_theta * self.phi.cos(),
            sin_theta * self.phi.sin(),
            self.cos_theta,
        )
    }

    /// Unit vector of motion, the opposite of [`Direction::source_vector`].
    pub fn momentum_vector(&self) -> Vector3<f64> {
        -self.source_vector()
    }
}

/// Angular distributions of the components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngularModel {
    /// Uniform over the upper (sky-side) hemisphere.
    DownwardIsotropic,
    /// Uniform over the lower (earth-side) hemisphere.
    UpwardIsotropic,
    /// Downward hemisphere with flux density proportional to `1 + a sin(theta)`.
    ZenithWeighted { anisotropy: f64 },
}

impl AngularModel {
    /// Zenith-weighted model of the AMS reentrant leptons.
    pub fn zenith_weighted() -> Self {
        AngularModel::ZenithWeighted { anisotropy: 0.6 }
    }

    /// Sample an arrival direction.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Direction {
        match *self {
            AngularModel::DownwardIsotropic => {
                let theta = rng.flat().acos();
                let phi = rng.flat() * 2.0 * PI;
                Direction::new(theta.cos(), phi)
            }
            AngularModel::UpwardIsotropic => {
                let theta = PI - rng.flat().acos();
                let phi = rng.flat() * 2.0 * PI;
                Direction::new(theta.cos(), phi)
            }
            AngularModel::ZenithWeighted { anisotropy } => {
                let theta = loop {
                    let theta = rng.flat().acos();
                    if rng.flat() * (1.0 + anisotropy) < 1.0 + anisotropy * theta.sin() {
                        break theta;
                    }
                };
                let phi = rng.flat() * 2.0 * PI;
                Direction::new(theta.cos(), phi)
            }
        }
    }

    /// Solid angle the particles come from, sr.
    pub fn solid_angle(&self) -> f64 {
        2.0 * PI
    }

    /// Hemisphere-averaged flux over the vertical flux.
    pub fn mean_flux_factor(&self) -> f64 {
        match *self {
            AngularModel::DownwardIsotropic | AngularModel::UpwardIsotropic => 1.0,
            // mean of sin(theta) over the hemisphere is pi/4
            AngularModel::ZenithWeighted { anisotropy } => 1.0 + anisotropy * PI / 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_downward_isotropic_is_downward() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let d = AngularModel::DownwardIsotropic.sample(&mut rng);
            assert!(d.cos_theta >= 0.0 && d.cos_theta <= 1.0);
            assert!(d.phi >= 0.0 && d.phi < 2.0 * PI);
        }
    }

    #[test]
    fn test_upward_isotropic_is_upward() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..1000 {
            let d = AngularModel::UpwardIsotropic.sample(&mut rng);
            assert!(d.cos_theta <= 1e-12);
        }
    }

    #[test]
    fn test_isotropic_cos_theta_is_uniform() {
        let mut rng = StdRng::seed_from_u64(13);
        let n = 50_000;
        let mean: f64 = (0..n)
            .map(|_| AngularModel::DownwardIsotropic.sample(&mut rng).cos_theta)
            .sum::<f64>()
            / n as f64;
        assert!((mean - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_scripted_isotropic_draws() {
        let mut seq = SequenceSource::new(vec![1.0, 0.25]);
        let d = AngularModel::DownwardIsotropic.sample(&mut seq);
        assert!((d.cos_theta - 1.0).abs() < 1e-15);
        assert!((d.phi - PI / 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_zenith_weighted_prefers_inclined_arrivals() {
        let mut rng = StdRng::seed_from_u64(14);
        let model = AngularModel::zenith_weighted();
        let n = 50_000;
        let mean: f64 = (0..n)
            .map(|_| model.sample(&mut rng).cos_theta)
            .sum::<f64>()
            / n as f64;
        // <cos> for density (1 + 0.6 sin) over the hemisphere
        let expected = (0.5 + 0.6 / 3.0) / (1.0 + 0.6 * PI / 4.0);
        assert!((mean - expected).abs() < 0.01, "{} vs {}", mean, expected);
        assert!(mean < 0.5);
    }

    #[test]
    fn test_mean_flux_factor() {
        assert_eq!(AngularModel::UpwardIsotropic.mean_flux_factor(), 1.0);
        let f = AngularModel::zenith_weighted().mean_flux_factor();
        assert!((f - (1.0 + 0.15 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_source_vector_is_unit() {
        let d = Direction::new(0.3, 1.1);
        assert!((d.source_vector().norm() - 1.0).abs() < 1e-12);
        assert_eq!(d.momentum_vector(), -d.source_vector());
        let zenith = Direction::new(1.0, 0.0).source_vector();
        assert!((zenith - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-15);
    }
}
