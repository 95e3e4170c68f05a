//! Metadata value types

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Camera body information.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Camera {
    /// Normalized manufacturer name (e.g. "Canon", "Nikon")
    pub make: String,
    /// Normalized model name
    pub model: String,
    /// Firmware / software string written by the camera
    pub software: String,
    /// Number of color channels of the sensor's filter array
    pub colors: u32,
}

/// Lens information.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lens {
    pub make: String,
    pub model: String,
    pub serial: String,
    /// Shortest focal length in mm
    pub min_focal: f64,
    /// Longest focal length in mm
    pub max_focal: f64,
    /// Widest aperture at the shortest focal length
    pub max_ap_min_focal: f64,
    /// Widest aperture at the longest focal length
    pub max_ap_max_focal: f64,
}

/// Exposure settings of a single shot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShotSettings {
    /// Seconds since the Unix epoch, 0 when the camera did not record it
    pub timestamp: i64,
    pub iso: u32,
    pub aperture: f64,
    /// Exposure time in seconds
    pub shutter: f64,
    /// Focal length in mm
    pub focal_length: f64,
    pub artist: String,
}

/// Everything readable from an opened RAW file without unpacking pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub timestamp: i64,
    /// Raw sensor width in pixels
    pub width: u32,
    /// Raw sensor height in pixels
    pub height: u32,
    /// Size of the source file in bytes
    pub data_size: u64,
    pub camera: Camera,
    pub lens: Lens,
    pub iso: u32,
    pub aperture: f64,
    pub shutter: f64,
    pub focal_length: f64,
    pub artist: String,
}

impl Metadata {
    pub fn captured_at(&self) -> Option<SystemTime> {
        match self.timestamp {
            ts if ts > 0 => Some(UNIX_EPOCH + Duration::from_secs(ts as u64)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_at() {
        let mut meta = Metadata::default();
        assert_eq!(meta.captured_at(), None);

        meta.timestamp = 1_700_000_000;
        let at = meta.captured_at().unwrap();
        assert_eq!(
            at.duration_since(UNIX_EPOCH).unwrap().as_secs(),
            1_700_000_000
        );
    }
}
