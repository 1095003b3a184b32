//! Scene state owned by the rendering side.
//!
//! The playback core only emits samples; this module owns the mutable
//! model transform. It clamps positions to a view box derived from the
//! camera distance and converts the pass-through rotation degrees into
//! clamped radians, so the model never leaves the frame however wild the
//! feed gets.

use beacon_core::TelemetrySample;
use nalgebra::Vector3;

/// Position and orientation of the rendered beacon model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTransform {
    /// Cartesian position, km, clamped to the view box
    pub position: Vector3<f64>,

    /// Rotation in radians, applied in (pitch, yaw, roll) order
    pub rotation_rad: Vector3<f64>,
}

/// The one mutable scene cell: camera distance plus the latest transform.
///
/// There is exactly one writer (the render loop applying delivered
/// samples); the playback core never touches this.
pub struct SceneState {
    /// Camera distance from the origin; also sets the clamp box
    pub camera_distance: f64,

    /// Current transform of the beacon model
    pub model: ModelTransform,
}

impl SceneState {
    /// Creates a scene with the model at the origin.
    pub fn new(camera_distance: f64) -> Self {
        Self {
            camera_distance,
            model: ModelTransform {
                position: Vector3::zeros(),
                rotation_rad: Vector3::zeros(),
            },
        }
    }

    /// Applies a freshly delivered sample to the model transform.
    ///
    /// Positions clamp to [-d/2, d/2] on x/y and [0, d] on z for camera
    /// distance d. Rotations clamp to pitch +-90, yaw +-180, roll +-90
    /// degrees before the radian conversion.
    pub fn apply_sample(&mut self, sample: &TelemetrySample) {
        let half = self.camera_distance / 2.0;

        self.model.position = Vector3::new(
            sample.position.x.clamp(-half, half),
            sample.position.y.clamp(-half, half),
            sample.position.z.clamp(0.0, self.camera_distance),
        );

        self.model.rotation_rad = Vector3::new(
            sample.rotation.pitch_deg.clamp(-90.0, 90.0).to_radians(),
            sample.rotation.yaw_deg.clamp(-180.0, 180.0).to_radians(),
            sample.rotation.roll_deg.clamp(-90.0, 90.0).to_radians(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{parse_record, CartesianConvention, EARTH_RADIUS_KM};

    fn sample(line: &str) -> TelemetrySample {
        parse_record(line, EARTH_RADIUS_KM, CartesianConvention::LatFirst).unwrap()
    }

    #[test]
    fn test_position_clamped_to_view_box() {
        let mut scene = SceneState::new(1000.0);
        // On the sphere surface the raw coordinates are thousands of km
        let s = sample("Message 1 L[10.0,20.0,5.0] R[0.0,0.0,0.0] RD[2024-01-01T00:00:00]");
        scene.apply_sample(&s);

        assert_eq!(scene.model.position.x, 500.0);
        assert_eq!(scene.model.position.y, 500.0);
        assert_eq!(scene.model.position.z, 1000.0);
    }

    #[test]
    fn test_negative_z_floors_at_zero() {
        let mut scene = SceneState::new(1000.0);
        let s = sample("Message 2 L[-45.0,0.0,0.0] R[0.0,0.0,0.0] RD[2024-01-01T00:00:01]");
        scene.apply_sample(&s);

        assert_eq!(scene.model.position.z, 0.0);
    }

    #[test]
    fn test_rotation_clamped_then_converted() {
        let mut scene = SceneState::new(1000.0);
        let s = sample("Message 3 L[0.0,0.0,0.0] R[270.0,120.0,-100.0] RD[2024-01-01T00:00:02]");
        scene.apply_sample(&s);

        // (pitch, yaw, roll) order: pitch 120 -> 90, yaw 270 -> 180, roll -100 -> -90
        assert!((scene.model.rotation_rad.x - 90f64.to_radians()).abs() < 1e-12);
        assert!((scene.model.rotation_rad.y - 180f64.to_radians()).abs() < 1e-12);
        assert!((scene.model.rotation_rad.z + 90f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_in_range_rotation_passes_through() {
        let mut scene = SceneState::new(1000.0);
        let s = sample("Message 4 L[0.0,0.0,0.0] R[15.0,30.0,-10.0] RD[2024-01-01T00:00:03]");
        scene.apply_sample(&s);

        assert!((scene.model.rotation_rad.x - 30f64.to_radians()).abs() < 1e-12);
        assert!((scene.model.rotation_rad.y - 15f64.to_radians()).abs() < 1e-12);
        assert!((scene.model.rotation_rad.z + 10f64.to_radians()).abs() < 1e-12);
    }
}
