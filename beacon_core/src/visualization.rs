//! Visualization module for the beacon viewer using Rerun.io
//!
//! This module streams the playback scene to a Rerun viewer:
//! - The decorative planet sphere and background starfield
//! - The beacon's position and heading as samples arrive
//! - A text readout of message id and timestamp
//!
//! Enable with the `visualization` feature flag.

use crate::telemetry::TelemetrySample;
use nalgebra::Vector3;
use rand::Rng;
use rerun::{RecordingStream, RecordingStreamBuilder};

/// Rerun-based visualizer for beacon telemetry playback
pub struct RerunVisualizer {
    rec: RecordingStream,
}

impl RerunVisualizer {
    /// Create a new visualizer that spawns the Rerun viewer
    pub fn new(app_id: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).spawn()?;

        rec.log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())?;

        Ok(Self { rec })
    }

    /// Create a visualizer that saves to a file (for web sharing)
    pub fn new_to_file(app_id: &str, path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).save(path)?;

        rec.log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())?;

        Ok(Self { rec })
    }

    /// Log the decorative planet sphere at the origin
    pub fn log_earth(&self, radius_km: f64) -> Result<(), Box<dyn std::error::Error>> {
        let half = radius_km as f32;
        self.rec.log_static(
            "world/earth",
            &rerun::Ellipsoids3D::from_centers_and_half_sizes(
                [[0.0, 0.0, 0.0]],
                [[half, half, half]],
            )
            .with_colors([[40, 90, 200, 255]]) // Ocean blue
            .with_fill_mode(rerun::FillMode::Solid),
        )?;

        Ok(())
    }

    /// Log a scattered background starfield
    ///
    /// Stars are placed on random directions well outside the playback
    /// sphere so they read as a backdrop, not as data.
    pub fn log_star_field(
        &self,
        count: usize,
        radius_km: f64,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = rand::thread_rng();
        let mut points = Vec::with_capacity(count);

        while points.len() < count {
            let dir = Vector3::new(
                rng.gen::<f64>() - 0.5,
                rng.gen::<f64>() - 0.5,
                rng.gen::<f64>() - 0.5,
            );
            if dir.norm() < 1e-3 {
                continue;
            }
            let p = dir.normalize() * radius_km * (4.0 + 4.0 * rng.gen::<f64>());
            points.push([p.x as f32, p.y as f32, p.z as f32]);
        }

        self.rec.log_static(
            "world/stars",
            &rerun::Points3D::new(points)
                .with_colors([[255, 255, 255, 180]])
                .with_radii([20.0]),
        )?;

        Ok(())
    }

    /// Log one delivered telemetry sample: beacon point, heading, readout
    pub fn log_beacon(&self, sample: &TelemetrySample) -> Result<(), Box<dyn std::error::Error>> {
        let pos = [
            sample.position.x as f32,
            sample.position.y as f32,
            sample.position.z as f32,
        ];

        self.rec.log(
            "world/beacon/center",
            &rerun::Points3D::new([pos])
                .with_colors([[255, 80, 80, 255]]) // Beacon red
                .with_radii([60.0]),
        )?;

        // Heading arrow from yaw/pitch (degrees in the feed)
        let yaw = sample.rotation.yaw_deg.to_radians();
        let pitch = sample.rotation.pitch_deg.to_radians();
        let heading = Vector3::new(
            yaw.cos() * pitch.cos(),
            yaw.sin() * pitch.cos(),
            pitch.sin(),
        ) * 500.0;

        self.rec.log(
            "world/beacon/heading",
            &rerun::Arrows3D::from_vectors([[
                heading.x as f32,
                heading.y as f32,
                heading.z as f32,
            ]])
            .with_origins([pos])
            .with_colors([[255, 200, 0, 255]]), // Yellow
        )?;

        self.rec.log(
            "logs/readout",
            &rerun::TextLog::new(format!(
                "Message {} @ {} | pos=[{:.1}, {:.1}, {:.1}] km",
                sample.message_id, sample.timestamp, sample.position.x, sample.position.y,
                sample.position.z
            )),
        )?;

        Ok(())
    }
}
