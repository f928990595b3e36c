//! Area quantification: binary rasters into scalar ground areas.

use crate::types::{
    is_true, AreaRecord, ChangeResult, ConfirmedChange, Raster, RasterGeometry,
};

/// Weights binary rasters by per-pixel ground area and sums them.
///
/// The ground-area raster comes from an external collaborator and accounts
/// for projection distortion; sums are in its native unit, converted once at
/// the caller's boundary, never per call.
pub struct AreaQuantifier {
    pixel_areas: Raster,
}

impl AreaQuantifier {
    pub fn new(pixel_areas: Raster, geometry: &RasterGeometry) -> ChangeResult<Self> {
        pixel_areas.check_geometry(geometry, "area quantifier")?;
        Ok(Self { pixel_areas })
    }

    /// Total ground area of valid-true cells.
    ///
    /// False and invalid cells contribute zero, so an all-invalid raster
    /// (a no-data year) measures exactly 0.0 rather than failing.
    pub fn measure(&self, binary: &Raster) -> ChangeResult<f64> {
        binary.check_aligned(&self.pixel_areas, "area quantifier")?;

        let mut total = 0.0f64;
        for ((row, col), v) in binary.data.indexed_iter() {
            if !is_true(*v) {
                continue;
            }
            let weight = self.pixel_areas.data[[row, col]];
            if weight.is_finite() {
                total += weight as f64;
            }
        }
        Ok(total)
    }

    /// Ordered per-year area records for a confirmed-change sequence
    pub fn measure_years(&self, confirmed: &[ConfirmedChange]) -> ChangeResult<Vec<AreaRecord>> {
        let records = confirmed
            .iter()
            .map(|c| {
                let area = self.measure(&c.raster)?;
                log::debug!("Year {}: confirmed change area {}", c.year, area);
                Ok(AreaRecord { year: c.year, area })
            })
            .collect::<ChangeResult<Vec<_>>>()?;
        Ok(records)
    }
}
