//! Baseline reference state: aggregate the baseline-period composites and
//! threshold them into the binary mask every later year is compared against.

use ndarray::Array2;

use crate::core::composite::{reduce_stack, Reducer};
use crate::types::{AnnualComposite, CellValue, ChangeResult, Raster, RasterGeometry};

/// Builds the baseline state mask from per-year composites
pub struct BaselineBuilder {
    geometry: RasterGeometry,
    start_year: i32,
    end_year: i32,
    /// Composite cells above this value count as the target state
    threshold: f32,
}

impl BaselineBuilder {
    pub fn new(geometry: RasterGeometry, start_year: i32, end_year: i32, threshold: f32) -> Self {
        Self {
            geometry,
            start_year,
            end_year,
            threshold,
        }
    }

    /// Build the baseline mask: 1.0 where the median baseline composite is
    /// above the threshold, invalid everywhere else.
    ///
    /// The aggregate is always a median so one anomalous baseline year cannot
    /// skew the reference. A baseline period with no observed years at all
    /// yields an all-invalid mask, which downstream stages read as "no
    /// detectable change anywhere" rather than an error.
    pub fn build(&self, composites: &[AnnualComposite]) -> ChangeResult<Raster> {
        let stack: Vec<&Raster> = composites
            .iter()
            .filter(|c| c.year >= self.start_year && c.year <= self.end_year)
            .filter_map(|c| c.observed())
            .collect();

        if stack.is_empty() {
            log::warn!(
                "Baseline period {}..={} has no observed years, mask is all-invalid",
                self.start_year,
                self.end_year
            );
            return Ok(Raster::all_invalid(self.geometry.clone()));
        }

        log::info!(
            "Building baseline mask from {} year(s) in {}..={}, threshold {}",
            stack.len(),
            self.start_year,
            self.end_year,
            self.threshold
        );

        let aggregate = reduce_stack(&stack, &self.geometry, Reducer::Median, "baseline builder")?;

        let mut mask =
            Array2::<CellValue>::from_elem((self.geometry.rows, self.geometry.cols), CellValue::NAN);
        for ((row, col), v) in aggregate.data.indexed_iter() {
            if v.is_finite() && *v > self.threshold {
                mask[[row, col]] = 1.0;
            }
        }

        let mask = Raster::new(self.geometry.clone(), mask)?;
        log::info!("Baseline mask covers {} pixel(s)", mask.true_count());
        Ok(mask)
    }
}
