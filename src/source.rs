//! External collaborator contracts.
//!
//! The engine consumes observations and area weights through these traits and
//! never implements them itself: acquisition, cloud/quality masking and index
//! computation all happen upstream. A failing source surfaces as
//! [`ChangeError::Source`](crate::types::ChangeError::Source); retry policy
//! belongs to the caller, not to any stage in here.

use chrono::{DateTime, Utc};

use crate::types::{BoundingBox, ChangeResult, Raster, RasterGeometry, TimestampedRaster};

/// Validity-filtered observation source.
///
/// Every returned raster is already restricted to the area of interest, masked
/// for sensor-specific invalid pixels, carries the index band the compositor
/// reduces over, and is stamped with its acquisition instant.
pub trait ObservationSource {
    fn observations(
        &self,
        aoi: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ChangeResult<Vec<TimestampedRaster>>;
}

/// Per-pixel ground-area provider.
///
/// Produces a raster on the analysis grid where each cell holds that cell's
/// ground area in a known unit, accounting for projection distortion. The
/// engine sums these weights as-is; unit conversion happens once at the
/// caller's boundary.
pub trait AreaWeights {
    fn pixel_areas(&self, geometry: &RasterGeometry) -> ChangeResult<Raster>;
}
