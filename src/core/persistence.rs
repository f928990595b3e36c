//! Temporal persistence filtering: a candidate change only becomes a
//! confirmed event when it holds over a minimum run of exactly-consecutive
//! calendar years. Isolated one-year signals are noise and never confirmed.

use ndarray::Array2;

use crate::types::{
    is_true, CandidateChange, CellValue, ChangeError, ChangeResult, ConfirmedChange, Raster,
    RasterGeometry,
};

/// Confirms candidate changes that persist across consecutive years
pub struct PersistenceFilter {
    geometry: RasterGeometry,
    /// Window length in calendar years; every year in the window must show
    /// the candidate for a confirmation to be emitted
    min_run: usize,
}

impl PersistenceFilter {
    pub fn new(geometry: RasterGeometry, min_run: usize) -> ChangeResult<Self> {
        if min_run < 2 {
            return Err(ChangeError::InvalidConfig(format!(
                "persistence run length must be at least 2, got {}",
                min_run
            )));
        }
        Ok(Self { geometry, min_run })
    }

    /// Slide a `min_run`-year window over the candidate sequence and emit a
    /// confirmed raster for each window of exactly-consecutive years, tagged
    /// with the window's earliest year ("change first observed starting in
    /// year Y").
    ///
    /// Candidates must be in strictly increasing year order. A calendar gap
    /// inside a window disqualifies the whole window: gaps are never
    /// bridged, and the skip is logged as a diagnostic, not an error.
    pub fn confirm(&self, candidates: &[CandidateChange]) -> ChangeResult<Vec<ConfirmedChange>> {
        for pair in candidates.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(ChangeError::Processing(format!(
                    "persistence filter: candidate years {} and {} are not strictly increasing",
                    pair[0].year, pair[1].year
                )));
            }
        }
        for candidate in candidates {
            candidate.raster.check_geometry(&self.geometry, "persistence filter")?;
        }

        if candidates.len() < self.min_run {
            log::info!(
                "Only {} candidate year(s) for a {}-year window, nothing to confirm",
                candidates.len(),
                self.min_run
            );
            return Ok(Vec::new());
        }

        let mut confirmed = Vec::new();
        for window in candidates.windows(self.min_run) {
            let first_year = window[0].year;
            let contiguous = window
                .iter()
                .enumerate()
                .all(|(k, c)| c.year == first_year + k as i32);
            if !contiguous {
                log::debug!(
                    "Calendar gap inside window starting {}, skipping confirmation",
                    first_year
                );
                continue;
            }
            confirmed.push(ConfirmedChange {
                year: first_year,
                raster: self.window_and(window)?,
            });
        }

        let total: usize = confirmed.iter().map(|c| c.raster.true_count()).sum();
        log::info!(
            "Persistence filter: {} confirmed year(s), {} confirmed pixel(s) total",
            confirmed.len(),
            total
        );
        Ok(confirmed)
    }

    /// Pixel-wise AND over a window. The output inherits the validity domain
    /// of the window's first raster (the baseline-masked region).
    fn window_and(&self, window: &[CandidateChange]) -> ChangeResult<Raster> {
        let mut out =
            Array2::<CellValue>::from_elem((self.geometry.rows, self.geometry.cols), CellValue::NAN);

        for ((row, col), first) in window[0].raster.data.indexed_iter() {
            if first.is_nan() {
                continue;
            }
            let all_true = window.iter().all(|c| is_true(c.raster.data[[row, col]]));
            out[[row, col]] = if all_true { 1.0 } else { 0.0 };
        }
        Raster::new(self.geometry.clone(), out)
    }
}
