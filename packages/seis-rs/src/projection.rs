//! WGS84 Universal Transverse Mercator forward projection

use crate::error::{Result, SeisError};
use serde::{Deserialize, Serialize};

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const SCALE: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

/// UTM zone projection; `project` maps (lon, lat) degrees to (easting, northing) meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmProjection {
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

impl UtmProjection {
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(SeisError::InvalidParameter(format!(
                "UTM zone must be in 1..=60, got {}",
                zone
            )));
        }
        Ok(Self { zone, hemisphere })
    }

    /// Parse "10", "10N" or "56S"
    pub fn parse(zone: &str) -> Result<Self> {
        let zone = zone.trim();
        let (digits, hemisphere) = match zone.chars().last() {
            Some('S') | Some('s') => (&zone[..zone.len() - 1], Hemisphere::South),
            Some('N') | Some('n') => (&zone[..zone.len() - 1], Hemisphere::North),
            _ => (zone, Hemisphere::North),
        };
        let number = digits
            .parse::<u8>()
            .map_err(|_| SeisError::ParseError(format!("Invalid UTM zone '{}'", zone)))?;
        Self::new(number, hemisphere)
    }

    /// Longitude of the zone's central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        (self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    pub fn project(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let phi = latitude.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * (longitude - self.central_meridian()).to_radians();

        // Meridional arc length
        let m = WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let easting = SCALE
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
            + FALSE_EASTING;
        let mut northing = SCALE
            * (m + n
                * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));
        if self.hemisphere == Hemisphere::South {
            northing += FALSE_NORTHING_SOUTH;
        }
        (easting, northing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_meridian_point() {
        let proj = UtmProjection::new(13, Hemisphere::North).unwrap();
        let (x, y) = proj.project(-105.0, 40.0);
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!((y - 4_427_757.219).abs() < 0.01);
    }

    #[test]
    fn test_off_meridian_points() {
        let proj = UtmProjection::parse("10").unwrap();
        let (x, y) = proj.project(-122.2, 37.8);
        assert!((x - 570_428.762).abs() < 0.01);
        assert!((y - 4_183_926.351).abs() < 0.01);

        let south = UtmProjection::parse("56S").unwrap();
        let (x, y) = south.project(151.2093, -33.8688);
        assert!((x - 334_368.634).abs() < 0.01);
        assert!((y - 6_250_948.345).abs() < 0.01);
    }

    #[test]
    fn test_invalid_zones() {
        assert!(UtmProjection::new(0, Hemisphere::North).is_err());
        assert!(UtmProjection::new(61, Hemisphere::North).is_err());
        assert!(UtmProjection::parse("ten").is_err());
    }
}
