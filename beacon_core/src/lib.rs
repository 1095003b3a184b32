//! Beacon Core - Satellite Beacon Telemetry Playback
//!
//! This library implements the reproducible core of the beacon viewer:
//! 1. **Record Parser**: one tagged feed line in, one immutable sample out
//! 2. **Geodetic Conversion**: lat/lon/alt to Cartesian on a 6371 km sphere
//! 3. **Playback Driver**: fixed-period looping replay with clean shutdown
//!
//! Rendering is a collaborator, not a concern: the driver only emits
//! structured samples, and the optional `visualization` feature streams
//! them to the Rerun viewer.

pub mod geodetic;
pub mod playback;
pub mod telemetry;

#[cfg(feature = "visualization")]
pub mod visualization;

// Re-export key types for convenience
pub use geodetic::{CartesianConvention, GeodeticPosition, EARTH_RADIUS_KM};
pub use playback::{PlaybackConfig, PlaybackDriver, PlaybackHandle, PlaybackState, PlaybackTick};
pub use telemetry::{parse_record, Orientation, ParseError, TelemetrySample};
