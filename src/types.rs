use chrono::{DateTime, Datelike, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Cell value of an analysis raster. Invalid (masked) cells hold NaN.
pub type CellValue = f32;

/// Geospatial bounding box describing the area of interest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// Geospatial transformation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

/// Grid definition shared by every raster in one analysis.
///
/// All pixel-wise operations require operand geometries to be identical;
/// a mismatch is a fatal precondition violation, never silently resolved
/// by reprojection or cropping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterGeometry {
    pub rows: usize,
    pub cols: usize,
    pub geo_transform: GeoTransform,
    pub epsg: u32,
}

impl RasterGeometry {
    /// Compact description used in geometry-mismatch diagnostics
    pub fn describe(&self) -> String {
        format!(
            "{}x{} @ {:.6}m EPSG:{}",
            self.rows, self.cols, self.geo_transform.pixel_width, self.epsg
        )
    }
}

/// A single-band raster over the analysis grid.
///
/// Cells are `f32`; a cell is invalid exactly when its value is NaN. Binary
/// rasters reuse the same representation with 1.0 = true, 0.0 = false and
/// NaN = invalid.
#[derive(Debug, Clone)]
pub struct Raster {
    pub geometry: RasterGeometry,
    pub data: Array2<CellValue>,
}

impl Raster {
    /// Create a raster, checking that the array shape matches the geometry
    pub fn new(geometry: RasterGeometry, data: Array2<CellValue>) -> ChangeResult<Self> {
        let (rows, cols) = data.dim();
        if rows != geometry.rows || cols != geometry.cols {
            return Err(ChangeError::Processing(format!(
                "Raster data shape {}x{} does not match geometry {}",
                rows,
                cols,
                geometry.describe()
            )));
        }
        Ok(Self { geometry, data })
    }

    /// Raster with every cell set to `value`
    pub fn filled(geometry: RasterGeometry, value: CellValue) -> Self {
        let data = Array2::from_elem((geometry.rows, geometry.cols), value);
        Self { geometry, data }
    }

    /// Fully-invalid raster (every cell NaN)
    pub fn all_invalid(geometry: RasterGeometry) -> Self {
        Self::filled(geometry, CellValue::NAN)
    }

    /// Number of valid (non-NaN) cells
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    /// Number of cells that are valid and true under binary semantics
    pub fn true_count(&self) -> usize {
        self.data.iter().filter(|v| is_true(**v)).count()
    }

    /// Verify this raster lies on the expected analysis grid
    pub fn check_geometry(&self, expected: &RasterGeometry, stage: &str) -> ChangeResult<()> {
        if &self.geometry != expected {
            return Err(ChangeError::GeometryMismatch {
                stage: stage.to_string(),
                left: expected.describe(),
                right: self.geometry.describe(),
            });
        }
        Ok(())
    }

    /// Verify this raster shares the analysis grid of `other`.
    ///
    /// `stage` names the pipeline stage performing the pixel-wise operation,
    /// so the error pinpoints where the misaligned pair was fed in.
    pub fn check_aligned(&self, other: &Raster, stage: &str) -> ChangeResult<()> {
        if self.geometry != other.geometry {
            return Err(ChangeError::GeometryMismatch {
                stage: stage.to_string(),
                left: self.geometry.describe(),
                right: other.geometry.describe(),
            });
        }
        Ok(())
    }
}

/// Binary-raster truth test: valid and set
#[inline]
pub fn is_true(value: CellValue) -> bool {
    value.is_finite() && value > 0.5
}

/// A validity-masked observation raster with its acquisition instant
#[derive(Debug, Clone)]
pub struct TimestampedRaster {
    pub timestamp: DateTime<Utc>,
    pub raster: Raster,
}

impl TimestampedRaster {
    /// Calendar year of the acquisition instant (UTC)
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }
}

/// Composite content for one calendar year.
///
/// An empty year is a distinct variant rather than an all-NaN raster, so the
/// no-data case is type-checkable and never enters pixel arithmetic by
/// accident.
#[derive(Debug, Clone)]
pub enum CompositeState {
    Observed(Raster),
    NoData,
}

/// One representative raster per calendar year
#[derive(Debug, Clone)]
pub struct AnnualComposite {
    pub year: i32,
    pub state: CompositeState,
}

impl AnnualComposite {
    pub fn observed(&self) -> Option<&Raster> {
        match &self.state {
            CompositeState::Observed(raster) => Some(raster),
            CompositeState::NoData => None,
        }
    }
}

/// Single-year change signal, not yet validated for persistence
#[derive(Debug, Clone)]
pub struct CandidateChange {
    pub year: i32,
    pub raster: Raster,
}

/// Change signal confirmed over a minimum run of consecutive years,
/// tagged with the earliest year of its run
#[derive(Debug, Clone)]
pub struct ConfirmedChange {
    pub year: i32,
    pub raster: Raster,
}

/// Measured change area for one year, in the ground-area raster's native unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub year: i32,
    pub area: f64,
}

/// Error types for change analysis
#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Geometry mismatch in {stage}: {left} vs {right}")]
    GeometryMismatch {
        stage: String,
        left: String,
        right: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Observation source error (retryable): {0}")]
    Source(String),
}

/// Result type for change-analysis operations
pub type ChangeResult<T> = Result<T, ChangeError>;
