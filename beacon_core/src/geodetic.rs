//! Geodetic positions and spherical-to-Cartesian conversion.
//!
//! The feed reports positions as [latitude, longitude, altitude] triples;
//! the viewer wants Cartesian kilometres on a sphere. Two arrangements of
//! the same conversion circulated in early revisions of the feed tooling,
//! so the arrangement is explicit configuration rather than a guess.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Sphere radius used for the Cartesian conversion, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Which spherical-to-Cartesian arrangement to apply.
///
/// Both arrangements place the point at distance `radius + altitude` from
/// the origin; they differ only in how the latitude field is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CartesianConvention {
    /// Latitude measured from the equatorial plane (physics convention):
    ///
    /// ```text
    /// x = (R + alt) * cos(lat) * cos(lon)
    /// y = (R + alt) * cos(lat) * sin(lon)
    /// z = (R + alt) * sin(lat)
    /// ```
    #[default]
    LatFirst,

    /// Latitude read as a polar angle from the +z axis (sin/cos swapped):
    ///
    /// ```text
    /// x = (R + alt) * sin(lat) * cos(lon)
    /// y = (R + alt) * sin(lat) * sin(lon)
    /// z = (R + alt) * cos(lat)
    /// ```
    LonFirst,
}

impl std::str::FromStr for CartesianConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lat-first" => Ok(Self::LatFirst),
            "lon-first" => Ok(Self::LonFirst),
            other => Err(format!("unknown convention: {}", other)),
        }
    }
}

/// A global position as carried by the feed's `L[lat,lon,alt]` tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Latitude in degrees
    pub latitude_deg: f64,

    /// Longitude in degrees
    pub longitude_deg: f64,

    /// Altitude above the sphere surface, same linear unit as the radius
    pub altitude_km: f64,
}

impl GeodeticPosition {
    /// Creates a position from the feed's degree/kilometre fields.
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }

    /// Converts to Cartesian coordinates on a sphere of `radius_km`.
    ///
    /// Degrees are converted to radians internally. The result always
    /// satisfies `|v| = radius_km + altitude_km` regardless of convention.
    pub fn to_cartesian(&self, radius_km: f64, convention: CartesianConvention) -> Vector3<f64> {
        let lat = self.latitude_deg.to_radians();
        let lon = self.longitude_deg.to_radians();
        let r = radius_km + self.altitude_km;

        match convention {
            CartesianConvention::LatFirst => Vector3::new(
                r * lat.cos() * lon.cos(),
                r * lat.cos() * lon.sin(),
                r * lat.sin(),
            ),
            CartesianConvention::LonFirst => Vector3::new(
                r * lat.sin() * lon.cos(),
                r * lat.sin() * lon.sin(),
                r * lat.cos(),
            ),
        }
    }
}
