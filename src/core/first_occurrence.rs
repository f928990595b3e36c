//! First-occurrence resolution: collapse the confirmed-change sequence into
//! one raster holding, per pixel, the earliest confirmed year.

use ndarray::Array2;

use crate::types::{
    is_true, CellValue, ChangeError, ChangeResult, ConfirmedChange, Raster, RasterGeometry,
};

/// Resolves the earliest confirmed-change year per pixel
pub struct FirstOccurrenceResolver {
    geometry: RasterGeometry,
}

impl FirstOccurrenceResolver {
    pub fn new(geometry: RasterGeometry) -> Self {
        Self { geometry }
    }

    /// Walk the confirmed rasters in increasing year order; the first raster
    /// in which a pixel is valid-true dates that pixel, and later
    /// confirmations never overwrite it. Pixels confirmed in no input year
    /// are invalid in the output.
    ///
    /// Under the fixed-baseline detector a recovered-then-relapsed pixel can
    /// carry confirmations in several years; the earliest one is the year of
    /// first persistent change.
    pub fn resolve(&self, confirmed: &[ConfirmedChange]) -> ChangeResult<Raster> {
        for pair in confirmed.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(ChangeError::Processing(format!(
                    "first-occurrence resolver: years {} and {} are not strictly increasing",
                    pair[0].year, pair[1].year
                )));
            }
        }

        let mut out =
            Array2::<CellValue>::from_elem((self.geometry.rows, self.geometry.cols), CellValue::NAN);

        for change in confirmed {
            change.raster.check_geometry(&self.geometry, "first-occurrence resolver")?;
            for ((row, col), v) in change.raster.data.indexed_iter() {
                if is_true(*v) && out[[row, col]].is_nan() {
                    out[[row, col]] = change.year as CellValue;
                }
            }
        }

        let raster = Raster::new(self.geometry.clone(), out)?;
        log::info!(
            "First-occurrence raster: {} dated pixel(s) from {} confirmed year(s)",
            raster.valid_count(),
            confirmed.len()
        );
        Ok(raster)
    }
}
