//! Geographic to geomagnetic coordinate conversion.

use crate::error::{CrError, CrResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

/// Converts geographic latitude/longitude (degrees) to geomagnetic ones.
pub trait CoordinateTransform: std::fmt::Debug {
    fn geomagnetic_latitude(&self, latitude: f64, longitude: f64) -> f64;
    fn geomagnetic_longitude(&self, latitude: f64, longitude: f64) -> f64;
}

/// Number of latitude rows (-30 to 30 degrees in steps of 5).
pub const GRID_LATITUDES: usize = 13;
/// Number of longitude columns (0 to 360 degrees in steps of 5).
pub const GRID_LONGITUDES: usize = 73;

/// Tabulated geomagnetic coordinates for `|latitude| <= 30` degrees, where
/// the centred dipole is a poor description of the field.
///
/// Both tables are flat with index `ilat + 13 * ilon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowLatitudeGrid {
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
}

impl LowLatitudeGrid {
    pub fn new(latitudes: Vec<f64>, longitudes: Vec<f64>) -> CrResult<Self> {
        let expected = GRID_LATITUDES * GRID_LONGITUDES;
        for table in [&latitudes, &longitudes] {
            if table.len() != expected {
                return Err(CrError::GridShape {
                    expected,
                    found: table.len(),
                });
            }
        }
        Ok(Self {
            latitudes,
            longitudes,
        })
    }

    pub fn from_json_str(json: &str) -> CrResult<Self> {
        let raw: LowLatitudeGrid = serde_json::from_str(json)?;
        Self::new(raw.latitudes, raw.longitudes)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CrResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CrError::GridIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// Bilinear interpolation in a low-latitude table.
///
/// Latitudes beyond +-30 degrees are extrapolated from the edge cell.
pub fn interpolate_grid(latitude: f64, longitude: f64, table: &[f64]) -> f64 {
    if latitude.abs() > 30.0 {
        log::warn!(
            "latitude {} is outside the low-latitude grid, extrapolating",
            latitude
        );
    }
    let lon = longitude.rem_euclid(360.0);

    let mut ilat = (latitude / 5.0 + 6.0) as i64;
    let mut a = (latitude + 30.0) % 5.0 / 5.0;
    if ilat < 0 || ilat > (GRID_LATITUDES - 2) as i64 {
        ilat = ilat.clamp(0, (GRID_LATITUDES - 2) as i64);
        a = (latitude + 30.0) / 5.0 - ilat as f64;
    }
    let ilat = ilat as usize;
    let ilon = ((lon / 5.0) as usize).min(GRID_LONGITUDES - 2);
    let b = lon / 5.0 - ilon as f64;

    table[ilat + GRID_LATITUDES * ilon] * (1.0 - a) * (1.0 - b)
        + table[ilat + GRID_LATITUDES * (ilon + 1)] * (1.0 - a) * b
        + table[ilat + 1 + GRID_LATITUDES * ilon] * a * (1.0 - b)
        + table[ilat + 1 + GRID_LATITUDES * (ilon + 1)] * a * b
}

/// Centred dipole with the 2000 geomagnetic north pole, optionally refined
/// at low latitude by a [`LowLatitudeGrid`].
#[derive(Debug, Clone)]
pub struct DipoleTransform {
    pub pole_latitude: f64,
    pub pole_longitude: f64,
    grid: Option<LowLatitudeGrid>,
}

impl Default for DipoleTransform {
    fn default() -> Self {
        Self {
            pole_latitude: 79.55,
            pole_longitude: -71.57,
            grid: None,
        }
    }
}

impl DipoleTransform {
    pub fn with_grid(grid: LowLatitudeGrid) -> Self {
        Self {
            grid: Some(grid),
            ..Self::default()
        }
    }

    pub fn grid(&self) -> Option<&LowLatitudeGrid> {
        self.grid.as_ref()
    }

    fn sin_latitude(&self, latitude: f64, longitude: f64) -> f64 {
        let (lat, lon) = (latitude * PI / 180.0, longitude * PI / 180.0);
        let (plat, plon) = (self.pole_latitude * PI / 180.0, self.pole_longitude * PI / 180.0);
        lat.sin() * plat.sin() + lat.cos() * plat.cos() * (lon - plon).cos()
    }

    /// Dipole latitude in degrees.
    pub fn dipole_latitude(&self, latitude: f64, longitude: f64) -> f64 {
        let s = self.sin_latitude(latitude, longitude);
        let theta = if s < -0.999 {
            -PI / 2.0
        } else if s > 0.999 {
            PI / 2.0
        } else {
            s.asin()
        };
        theta * 180.0 / PI
    }

    /// Dipole longitude in degrees, in `[0, 360)`.
    pub fn dipole_longitude(&self, latitude: f64, longitude: f64) -> f64 {
        let (lat, lon) = (latitude * PI / 180.0, longitude * PI / 180.0);
        let (plat, plon) = (self.pole_latitude * PI / 180.0, self.pole_longitude * PI / 180.0);
        let gm_lat = self.sin_latitude(latitude, longitude).asin();

        let c = (lat.cos() * (lon - plon).cos() - plat.cos() * gm_lat.sin())
            / (plat.sin() * gm_lat.cos());
        let mut gm_lon = if c < -0.999 {
            PI
        } else if c > 0.999 {
            0.0
        } else {
            c.acos()
        };
        if lat.cos() * (lon - plon).sin() / gm_lat.cos() < 0.0 {
            gm_lon += PI;
        }
        gm_lon * 180.0 / PI
    }
}

impl CoordinateTransform for DipoleTransform {
    fn geomagnetic_latitude(&self, latitude: f64, longitude: f64) -> f64 {
        match &self.grid {
            Some(grid) if latitude.abs() <= 30.0 => {
                interpolate_grid(latitude, longitude, &grid.latitudes)
            }
            _ => self.dipole_latitude(latitude, longitude),
        }
    }

    fn geomagnetic_longitude(&self, latitude: f64, longitude: f64) -> f64 {
        match &self.grid {
            Some(grid) if latitude.abs() <= 30.0 => {
                interpolate_grid(latitude, longitude, &grid.longitudes)
            }
            _ => self.dipole_longitude(latitude, longitude),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// latitude table holds `lat + 0.01 * lon`, longitude table `lon`
    fn synthetic_grid() -> LowLatitudeGrid {
        let mut lats = vec![0.0; GRID_LATITUDES * GRID_LONGITUDES];
        let mut lons = vec![0.0; GRID_LATITUDES * GRID_LONGITUDES];
        for ilon in 0..GRID_LONGITUDES {
            for ilat in 0..GRID_LATITUDES {
                let lat = -30.0 + 5.0 * ilat as f64;
                let lon = 5.0 * ilon as f64;
                lats[ilat + GRID_LATITUDES * ilon] = lat + 0.01 * lon;
                lons[ilat + GRID_LATITUDES * ilon] = lon;
            }
        }
        LowLatitudeGrid::new(lats, lons).unwrap()
    }

    #[test]
    fn test_grid_node_is_exact() {
        let grid = synthetic_grid();
        assert_eq!(interpolate_grid(0.0, 0.0, &grid.latitudes), grid.latitudes[6]);
        assert_eq!(interpolate_grid(0.0, 0.0, &grid.latitudes), 0.0);
    }

    #[test]
    fn test_grid_is_bilinear_between_nodes() {
        let grid = synthetic_grid();
        let v = interpolate_grid(12.5, 102.5, &grid.latitudes);
        assert!((v - (12.5 + 1.025)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_longitude_wraps() {
        let grid = synthetic_grid();
        let west = interpolate_grid(-7.0, -90.0, &grid.longitudes);
        assert!((west - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_edges_do_not_overrun() {
        let grid = synthetic_grid();
        let v = interpolate_grid(30.0, 357.5, &grid.latitudes);
        assert!((v - (30.0 + 3.575)).abs() < 1e-9);
        let v = interpolate_grid(-30.0, 0.0, &grid.latitudes);
        assert!((v + 30.0).abs() < 1e-9);
        // extrapolated beyond the table
        let v = interpolate_grid(35.0, 0.0, &grid.latitudes);
        assert!((v - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_shape_is_checked() {
        let err = LowLatitudeGrid::new(vec![0.0; 5], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, CrError::GridShape { found: 5, .. }));
    }

    #[test]
    fn test_grid_from_json() {
        let grid = synthetic_grid();
        let json = serde_json::to_string(&grid).unwrap();
        let loaded = LowLatitudeGrid::from_json_str(&json).unwrap();
        assert_eq!(loaded.latitudes, grid.latitudes);
        assert!(LowLatitudeGrid::from_json_str("{\"latitudes\": [1.0]}").is_err());
        assert!(matches!(
            LowLatitudeGrid::from_json_file("/nonexistent/grid.json"),
            Err(CrError::GridIo { .. })
        ));
    }

    #[test]
    fn test_dipole_pole_and_equator() {
        let t = DipoleTransform::default();
        assert_eq!(t.geomagnetic_latitude(79.55, -71.57), 90.0);
        // antipode of the pole is the south geomagnetic pole
        assert_eq!(t.geomagnetic_latitude(-79.55, 108.43), -90.0);
        // a point 90 degrees from the pole sits on the geomagnetic equator
        let lat = t.dipole_latitude(-10.45, -71.57);
        assert!(lat.abs() < 1e-9, "{}", lat);
    }

    #[test]
    fn test_dipole_longitude_range() {
        let t = DipoleTransform::default();
        for (lat, lon) in [(45.0, 0.0), (-60.0, 120.0), (35.0, -150.0), (-40.0, -10.0)] {
            let gm = t.geomagnetic_longitude(lat, lon);
            assert!((0.0..360.0 + 1e-9).contains(&gm), "{} {} -> {}", lat, lon, gm);
        }
    }

    #[test]
    fn test_grid_used_only_at_low_latitude() {
        let t = DipoleTransform::with_grid(synthetic_grid());
        assert_eq!(t.geomagnetic_latitude(0.0, 0.0), 0.0);
        let high = t.geomagnetic_latitude(50.0, 20.0);
        assert_eq!(high, t.dipole_latitude(50.0, 20.0));
    }
}
