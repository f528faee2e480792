use serde::{Deserialize, Serialize};

/// Decimal places kept when a coordinate is used as an identity
/// (event UIDs, statistics cache keys). Four places is roughly 11 m.
pub const COORDINATE_PRECISION: i32 = 4;

/// Geographic location of the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
    /// Elevation above sea level in meters; only a hint for the oracle
    pub elevation_m: Option<f64>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m: None,
        }
    }

    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = Some(elevation_m);
        self
    }

    /// Coordinate snapped to [`COORDINATE_PRECISION`] decimal places.
    ///
    /// Elevation is snapped to whole meters. Negative zero is normalized so
    /// formatting is stable.
    pub fn rounded(&self) -> Self {
        Self {
            latitude: round_to(self.latitude, COORDINATE_PRECISION),
            longitude: round_to(self.longitude, COORDINATE_PRECISION),
            elevation_m: self.elevation_m.map(|e| e.round() + 0.0),
        }
    }

    /// Hashable identity of the rounded coordinate.
    pub fn key(&self) -> CoordinateKey {
        let scale = 10f64.powi(COORDINATE_PRECISION);
        CoordinateKey {
            lat_e4: (self.latitude * scale).round() as i64,
            lon_e4: (self.longitude * scale).round() as i64,
            elevation_m: self.elevation_m.map(|e| e.round() as i64),
        }
    }

    /// Stable text form used inside event identifiers and calendar names.
    pub fn label(&self) -> String {
        let r = self.rounded();
        format!("{:.4}, {:.4}", r.latitude, r.longitude)
    }
}

/// Integer form of a rounded [`Coordinate`], usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateKey {
    pub lat_e4: i64,
    pub lon_e4: i64,
    pub elevation_m: Option<i64>,
}

impl CoordinateKey {
    pub fn to_coordinate(&self) -> Coordinate {
        let scale = 10f64.powi(COORDINATE_PRECISION);
        Coordinate {
            latitude: self.lat_e4 as f64 / scale,
            longitude: self.lon_e4 as f64 / scale,
            elevation_m: self.elevation_m.map(|e| e as f64),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_keeps_four_places() {
        let c = Coordinate::new(45.58753958079636, -122.58886098861694);
        let r = c.rounded();
        assert_eq!(r.latitude, 45.5875);
        assert_eq!(r.longitude, -122.5889);
    }

    #[test]
    fn test_rounded_normalizes_negative_zero() {
        let c = Coordinate::new(-0.00001, 0.0);
        assert_eq!(c.label(), "0.0000, 0.0000");
    }

    #[test]
    fn test_key_roundtrip() {
        let c = Coordinate::new(68.3495, 18.8312).with_elevation(412.4);
        let key = c.key();
        assert_eq!(key.lat_e4, 683495);
        assert_eq!(key.elevation_m, Some(412));
        let back = key.to_coordinate();
        assert!((back.latitude - 68.3495).abs() < 1e-9);
        assert_eq!(back.elevation_m, Some(412.0));
    }

    #[test]
    fn test_nearby_coordinates_share_key() {
        let a = Coordinate::new(45.587539, -122.588861);
        let b = Coordinate::new(45.587541, -122.588859);
        assert_eq!(a.key(), b.key());
    }
}
