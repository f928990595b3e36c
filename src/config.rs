//! Analysis configuration.
//!
//! Everything that shapes the detection semantics is supplied by the caller:
//! nothing in the core stages hardcodes a region, period, threshold or reducer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::composite::Reducer;
use crate::types::{BoundingBox, ChangeError, ChangeResult, RasterGeometry};

/// Observation window for one sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorWindow {
    /// Sensor identifier, opaque to the engine (e.g. "landsat-5")
    pub sensor: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Complete configuration surface of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Area of interest handed to the observation source
    pub aoi: BoundingBox,
    /// Per-sensor acquisition windows, merged into one observation sequence
    pub sensor_windows: Vec<SensorWindow>,
    /// Analysis grid every raster must share
    pub geometry: RasterGeometry,
    /// First and last baseline year, inclusive
    pub baseline_years: (i32, i32),
    /// First and last analyzed post-baseline year, inclusive
    pub analysis_years: (i32, i32),
    /// Baseline mask threshold: composite cells above it count as the
    /// target state (e.g. a vegetation-index forest cutoff)
    pub baseline_threshold: f32,
    /// Candidate-change threshold: composite cells below it, inside the
    /// baseline mask, become candidates
    pub detection_threshold: f32,
    /// Minimum run of consecutive calendar years a candidate must hold
    pub min_run: usize,
    /// Pixel-wise reducer for annual composites, indicator-specific
    pub reducer: Reducer,
}

impl AnalysisConfig {
    /// Reject configurations the pipeline cannot give a meaningful answer for
    pub fn validate(&self) -> ChangeResult<()> {
        if self.sensor_windows.is_empty() {
            return Err(ChangeError::InvalidConfig(
                "at least one sensor window is required".to_string(),
            ));
        }
        for window in &self.sensor_windows {
            if window.start > window.end {
                return Err(ChangeError::InvalidConfig(format!(
                    "sensor window for '{}' has start after end",
                    window.sensor
                )));
            }
        }
        if self.geometry.rows == 0 || self.geometry.cols == 0 {
            return Err(ChangeError::InvalidConfig(
                "analysis grid must have non-zero dimensions".to_string(),
            ));
        }
        let (b0, b1) = self.baseline_years;
        let (a0, a1) = self.analysis_years;
        if b0 > b1 {
            return Err(ChangeError::InvalidConfig(format!(
                "baseline year range {}..={} is inverted",
                b0, b1
            )));
        }
        if a0 > a1 {
            return Err(ChangeError::InvalidConfig(format!(
                "analysis year range {}..={} is inverted",
                a0, a1
            )));
        }
        if a0 <= b1 {
            return Err(ChangeError::InvalidConfig(format!(
                "analysis years must start after the baseline period ({} <= {})",
                a0, b1
            )));
        }
        if self.min_run < 2 {
            return Err(ChangeError::InvalidConfig(format!(
                "persistence run length must be at least 2, got {}",
                self.min_run
            )));
        }
        if !self.baseline_threshold.is_finite() || !self.detection_threshold.is_finite() {
            return Err(ChangeError::InvalidConfig(
                "thresholds must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
