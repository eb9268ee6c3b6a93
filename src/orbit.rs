use crate::coordinate::CoordinateTransform;
use crate::latitude::binning_angle;
use std::f64::consts::PI;

/// Vertical cutoff rigidity of the centred dipole at the equator, GV.
pub const EQUATORIAL_CUTOFF_RIGIDITY: f64 = 14.9;

/// Cutoff rigidity `14.9 (1 + h/R)^-2 cos^4(theta_M)` in GV
/// (Zombeck 1990; Longair 1992).
pub fn dipole_cutoff_rigidity(
    geomagnetic_latitude_deg: f64,
    altitude_km: f64,
    earth_radius_km: f64,
) -> f64 {
    let theta = geomagnetic_latitude_deg * PI / 180.0;
    EQUATORIAL_CUTOFF_RIGIDITY * (1.0 + altitude_km / earth_radius_km).powi(-2) * theta.cos().powi(4)
}

/// Where the instrument is and the conditions the models depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    /// geographic, degrees
    pub latitude: f64,
    pub longitude: f64,
    /// seconds
    pub time: f64,
    /// km above the surface
    pub altitude: f64,
    /// degrees
    pub geomagnetic_latitude: f64,
    pub geomagnetic_longitude: f64,
    /// GV
    pub cutoff_rigidity: f64,
    /// MV
    pub solar_wind_potential: f64,
}

impl OrbitState {
    /// Convert a geographic position and derive its dipole cutoff rigidity.
    pub fn locate(
        transform: &dyn CoordinateTransform,
        latitude: f64,
        longitude: f64,
        time: f64,
        altitude: f64,
        solar_wind_potential: f64,
        earth_radius_km: f64,
    ) -> Self {
        let geomagnetic_latitude = transform.geomagnetic_latitude(latitude, longitude);
        let geomagnetic_longitude = transform.geomagnetic_longitude(latitude, longitude);
        let cutoff_rigidity =
            dipole_cutoff_rigidity(geomagnetic_latitude, altitude, earth_radius_km);
        Self {
            latitude,
            longitude,
            time,
            altitude,
            geomagnetic_latitude,
            geomagnetic_longitude,
            cutoff_rigidity,
            solar_wind_potential,
        }
    }

    /// `|theta_M|` in radians for the latitude tables.
    pub fn binning_angle(&self) -> f64 {
        binning_angle(self.geomagnetic_latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::DipoleTransform;

    #[test]
    fn test_cutoff_rigidity_scaling() {
        assert!((dipole_cutoff_rigidity(0.0, 0.0, 6371.0) - 14.9).abs() < 1e-12);
        assert!(dipole_cutoff_rigidity(90.0, 0.0, 6371.0).abs() < 1e-12);
        let at_orbit = dipole_cutoff_rigidity(0.0, 6371.0, 6371.0);
        assert!((at_orbit - 14.9 / 4.0).abs() < 1e-12);
        let mid = dipole_cutoff_rigidity(-60.0, 0.0, 6371.0);
        assert!((mid - 14.9 / 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_locate_at_geomagnetic_pole() {
        let t = DipoleTransform::default();
        let orbit = OrbitState::locate(&t, 79.55, -71.57, 0.0, 550.0, 540.0, 6371.0);
        assert_eq!(orbit.geomagnetic_latitude, 90.0);
        assert!(orbit.cutoff_rigidity < 1e-12);
        assert!((orbit.binning_angle() - PI / 2.0).abs() < 1e-12);
    }
}
