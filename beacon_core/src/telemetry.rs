//! Record parsing: one line of the tagged feed into one telemetry sample.
//!
//! A record is a single line carrying four tags in producer-fixed order:
//!
//! ```text
//! Message 12 L[lat,lon,alt] R[yaw,pitch,roll] RD[2024-01-01T00:00:00]
//! ```
//!
//! A line missing any tag, or with a sub-group that is not a finite decimal
//! float, yields a `ParseError`. That is a recoverable condition: playback
//! treats it as "no sample this tick" and keeps going.

use crate::geodetic::{CartesianConvention, GeodeticPosition};
use chrono::NaiveDateTime;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RD tag datetime layout (ISO-8601 local, seconds precision).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Why a record failed to parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A required tag is absent from the record
    #[error("missing tag: {tag}")]
    MissingTag { tag: &'static str },

    /// A tag was present but its body was not a comma-separated triple
    #[error("malformed {tag} triple: {body}")]
    MalformedTriple { tag: &'static str, body: String },

    /// A numeric sub-group did not parse as a finite decimal float
    #[error("bad number in {tag}: {value}")]
    InvalidNumber { tag: &'static str, value: String },

    /// The RD tag body was not a valid datetime
    #[error("bad timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
}

/// Rotation as reported by the feed's `R[yaw,pitch,roll]` tag.
///
/// Values pass through in degrees, unconverted and unclamped; the rendering
/// side owns degree-to-radian conversion and any clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Yaw in degrees
    pub yaw_deg: f64,

    /// Pitch in degrees
    pub pitch_deg: f64,

    /// Roll in degrees
    pub roll_deg: f64,
}

/// The structured result of successfully parsing one record.
///
/// Immutable once constructed; playback hands these out and never mutates
/// them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// The `Message <digits>` identifier
    pub message_id: String,

    /// Observation time from the RD tag
    pub timestamp: NaiveDateTime,

    /// Cartesian position in kilometres, converted from the L tag
    pub position: Vector3<f64>,

    /// Rotation from the R tag, degrees pass-through
    pub rotation: Orientation,
}

/// Returns the bracketed body of `tag[...]` within the line.
fn bracketed<'a>(line: &'a str, tag: &'static str) -> Result<&'a str, ParseError> {
    let marker = format!("{}[", tag);
    let start = line
        .find(&marker)
        .ok_or(ParseError::MissingTag { tag })?
        + marker.len();
    let rest = &line[start..];
    let end = rest.find(']').ok_or(ParseError::MissingTag { tag })?;
    Ok(&rest[..end])
}

/// Parses a `tag[a,b,c]` body into exactly three finite floats.
fn float_triple(line: &str, tag: &'static str) -> Result<[f64; 3], ParseError> {
    let body = bracketed(line, tag)?;
    let parts: Vec<&str> = body.split(',').collect();
    if parts.len() != 3 {
        return Err(ParseError::MalformedTriple {
            tag,
            body: body.to_string(),
        });
    }

    let mut out = [0.0; 3];
    for (slot, raw) in out.iter_mut().zip(&parts) {
        let raw = raw.trim();
        let value: f64 = raw.parse().map_err(|_| ParseError::InvalidNumber {
            tag,
            value: raw.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ParseError::InvalidNumber {
                tag,
                value: raw.to_string(),
            });
        }
        *slot = value;
    }
    Ok(out)
}

/// Extracts the digits following `Message `.
fn message_id(line: &str) -> Result<String, ParseError> {
    const MARKER: &str = "Message ";
    let start = line
        .find(MARKER)
        .ok_or(ParseError::MissingTag { tag: "Message" })?
        + MARKER.len();
    let digits: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Err(ParseError::MissingTag { tag: "Message" });
    }
    Ok(digits)
}

/// Parses one raw record into a telemetry sample.
///
/// Pure function of its input: extracts the `Message`, `L`, `R` and `RD`
/// tags, converts the geodetic triple to Cartesian kilometres on a sphere
/// of `radius_km`, and passes the rotation through in degrees. Any missing
/// tag or unparsable sub-group is an error, never a panic.
pub fn parse_record(
    line: &str,
    radius_km: f64,
    convention: CartesianConvention,
) -> Result<TelemetrySample, ParseError> {
    let message_id = message_id(line)?;
    let [lat, lon, alt] = float_triple(line, "L")?;
    let [yaw, pitch, roll] = float_triple(line, "R")?;
    let stamp = bracketed(line, "RD")?;
    let timestamp = NaiveDateTime::parse_from_str(stamp.trim(), TIMESTAMP_FORMAT)?;

    let position = GeodeticPosition::new(lat, lon, alt).to_cartesian(radius_km, convention);

    Ok(TelemetrySample {
        message_id,
        timestamp,
        position,
        rotation: Orientation {
            yaw_deg: yaw,
            pitch_deg: pitch,
            roll_deg: roll,
        },
    })
}
