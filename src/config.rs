// Global configuration for the cosmic-ray generators
use crate::component::ComponentKind;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

// Global defaults read when generators are built or positioned
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Global configuration container for the generators.
///
/// Holds the defaults used when the host does not supply a value: orbit
/// altitude, solar-wind potential, the earth radius of the cutoff-rigidity
/// scaling, and the optional low-latitude geomagnetic grid.
///
/// A single global instance is exposed via the `CONFIG` static (a
/// `Lazy<Mutex<Config>>`). Obtain a guard with [`Config::global`] rather
/// than locking the mutex directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Altitude in km used by position updates that carry none.
    pub default_altitude_km: f64,
    /// Solar-wind potential in MV; 540 at solar minimum, 1100 at maximum.
    pub default_solar_wind_potential_mv: f64,
    pub earth_radius_km: f64,
    /// JSON file with the low-latitude geomagnetic grid.
    pub low_latitude_grid: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Config {
            default_altitude_km: 550.0,
            default_solar_wind_potential_mv: 540.0,
            earth_radius_km: 6371.0,
            low_latitude_grid: None,
        }
    }

    pub fn set_low_latitude_grid(&mut self, path: Option<&str>) {
        self.low_latitude_grid = path.map(str::to_string);
    }

    /// Restore the defaults
    pub fn clear(&mut self) {
        *self = Config::new();
    }

    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parse one element the way C `atof` does: the longest numeric prefix
/// after leading whitespace, or 0 when there is none.
pub fn leading_float(text: &str) -> f32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    let mut best = 0.0;
    // widen the prefix one char at a time and keep the last one that parses
    while end < bytes.len() {
        end += 1;
        if !text.is_char_boundary(end) {
            continue;
        }
        let candidate = &text[..end];
        if let Ok(value) = candidate.parse::<f32>() {
            best = value;
        } else if !is_numeric_prefix(candidate) {
            break;
        }
    }
    best
}

// prefixes such as "-", "1e" or "1e-" do not parse yet but may still grow
fn is_numeric_prefix(candidate: &str) -> bool {
    let last = candidate.chars().last().unwrap_or(' ');
    matches!(last, '+' | '-' | 'e' | 'E' | '.')
        && candidate
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | 'e' | 'E' | '.'))
}

/// Split a comma-separated parameter string into numbers.
///
/// Empty input gives an empty list; a trailing comma adds nothing.
pub fn parse_param_list(params: &str) -> Vec<f32> {
    let mut values = Vec::new();
    let mut rest = params;
    while !rest.is_empty() {
        values.push(leading_float(rest));
        match rest.find(',') {
            Some(i) => rest = &rest[i + 1..],
            None => break,
        }
    }
    values
}

pub const PRIMARY_BIT: i32 = 1;
pub const REENTRANT_BIT: i32 = 2;
pub const SPLASH_BIT: i32 = 4;
pub const ALL_COMPONENTS: i32 = PRIMARY_BIT | REENTRANT_BIT | SPLASH_BIT;

/// Settings decoded from a generator parameter string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorParams {
    /// bit 1 primary, bit 2 reentrant, bit 4 splash
    pub mask: i32,
    /// overall flux scale, applied when present
    pub normalization: Option<f64>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            mask: ALL_COMPONENTS,
            normalization: None,
        }
    }
}

impl GeneratorParams {
    /// First element is the component mask (0 or absent means all), the
    /// second, when positive, the normalization.
    pub fn parse(params: &str) -> Self {
        let values = parse_param_list(params);
        let mask = match values.first() {
            None => ALL_COMPONENTS,
            Some(&v) if v as i32 == 0 => ALL_COMPONENTS,
            Some(&v) => v as i32,
        };
        let normalization = values
            .get(1)
            .filter(|&&n| n > 0.0)
            .map(|&n| f64::from(n));
        Self {
            mask,
            normalization,
        }
    }

    pub fn includes(&self, kind: ComponentKind) -> bool {
        self.mask & kind.bit() != 0
    }
}
