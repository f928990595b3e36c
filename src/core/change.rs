//! Per-year change detection against the fixed baseline state.
//!
//! Every post-baseline year is compared to the same original baseline mask;
//! the reference never rolls forward. A pixel that recovers after one bad
//! year can therefore be flagged again in a later year, and the
//! first-occurrence resolver downstream decides which year is authoritative.

use ndarray::Array2;

use crate::types::{
    is_true, AnnualComposite, CandidateChange, CellValue, ChangeResult, Raster, RasterGeometry,
};

/// Detects single-year candidate change relative to the baseline mask
pub struct ChangeDetector {
    geometry: RasterGeometry,
    /// Composite cells below this value, inside the baseline mask, are
    /// candidate change
    threshold: f32,
}

impl ChangeDetector {
    pub fn new(geometry: RasterGeometry, threshold: f32) -> Self {
        Self { geometry, threshold }
    }

    /// Candidate raster for one year: 1.0 where the baseline is true and the
    /// composite is below the threshold, 0.0 where the baseline is true but
    /// the signal is absent, invalid outside the baseline mask.
    ///
    /// A no-data year yields all-false over the baseline: an empty year
    /// carries no change signal, it is not treated as unknown.
    pub fn detect(
        &self,
        composite: &AnnualComposite,
        baseline: &Raster,
    ) -> ChangeResult<CandidateChange> {
        baseline.check_geometry(&self.geometry, "change detector")?;
        if let Some(observed) = composite.observed() {
            observed.check_aligned(baseline, "change detector")?;
        }

        let mut out =
            Array2::<CellValue>::from_elem((self.geometry.rows, self.geometry.cols), CellValue::NAN);

        for ((row, col), b) in baseline.data.indexed_iter() {
            if !is_true(*b) {
                continue;
            }
            let hit = match composite.observed() {
                Some(observed) => {
                    let v = observed.data[[row, col]];
                    v.is_finite() && v < self.threshold
                }
                None => false,
            };
            out[[row, col]] = if hit { 1.0 } else { 0.0 };
        }

        let raster = Raster::new(self.geometry.clone(), out)?;
        log::debug!(
            "Year {}: {} candidate pixel(s) of {} in baseline",
            composite.year,
            raster.true_count(),
            baseline.true_count()
        );
        Ok(CandidateChange {
            year: composite.year,
            raster,
        })
    }

    /// Detect candidates for every composite, in year order.
    ///
    /// Years are independent given the fixed baseline and run in parallel.
    pub fn detect_years(
        &self,
        composites: &[AnnualComposite],
        baseline: &Raster,
    ) -> ChangeResult<Vec<CandidateChange>> {
        use rayon::prelude::*;

        log::info!(
            "Detecting change for {} year(s), threshold {}",
            composites.len(),
            self.threshold
        );
        composites
            .par_iter()
            .map(|composite| self.detect(composite, baseline))
            .collect()
    }
}
