//! Temporal compositing: collapse an irregular observation sequence into one
//! representative raster per calendar year.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::types::{
    AnnualComposite, CellValue, ChangeError, ChangeResult, CompositeState, Raster, RasterGeometry,
    TimestampedRaster,
};

/// Pixel-wise statistic used to collapse a stack of rasters into one.
///
/// Median suits index indicators where outliers must be suppressed; sum suits
/// cumulative quantities such as precipitation. The choice is per-indicator
/// and always supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reducer {
    Median,
    Sum,
}

/// Collapse a stack of aligned rasters cell-wise, ignoring invalid values.
///
/// A cell with no valid value in any layer is invalid in the result. The
/// stack must be non-empty; callers represent an empty stack with their own
/// sentinel instead.
pub fn reduce_stack(
    stack: &[&Raster],
    geometry: &RasterGeometry,
    reducer: Reducer,
    stage: &str,
) -> ChangeResult<Raster> {
    if stack.is_empty() {
        return Err(ChangeError::Processing(format!(
            "{}: cannot reduce an empty raster stack",
            stage
        )));
    }
    for raster in stack {
        raster.check_geometry(geometry, stage)?;
    }

    let mut output = Array2::<CellValue>::from_elem((geometry.rows, geometry.cols), CellValue::NAN);
    let mut values: Vec<CellValue> = Vec::with_capacity(stack.len());

    for row in 0..geometry.rows {
        for col in 0..geometry.cols {
            values.clear();
            for raster in stack {
                let v = raster.data[[row, col]];
                if v.is_finite() {
                    values.push(v);
                }
            }
            if values.is_empty() {
                continue;
            }
            output[[row, col]] = match reducer {
                Reducer::Sum => values.iter().sum(),
                Reducer::Median => median_of(&mut values),
            };
        }
    }

    Raster::new(geometry.clone(), output)
}

/// Median of a non-empty slice; even counts average the two middle values
fn median_of(values: &mut [CellValue]) -> CellValue {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Builds one composite raster per calendar year from a validity-masked
/// observation sequence
pub struct TemporalCompositor {
    geometry: RasterGeometry,
    reducer: Reducer,
}

impl TemporalCompositor {
    pub fn new(geometry: RasterGeometry, reducer: Reducer) -> Self {
        Self { geometry, reducer }
    }

    /// Composite all observations acquired within `year`.
    ///
    /// A year with no observations yields [`CompositeState::NoData`] so
    /// downstream stages see that the year exists but carries no data,
    /// instead of the year silently disappearing from the sequence.
    pub fn composite_year(
        &self,
        series: &[TimestampedRaster],
        year: i32,
    ) -> ChangeResult<AnnualComposite> {
        let selected: Vec<&Raster> = series
            .iter()
            .filter(|obs| obs.year() == year)
            .map(|obs| &obs.raster)
            .collect();

        if selected.is_empty() {
            log::debug!("No observations for year {}, emitting no-data composite", year);
            return Ok(AnnualComposite {
                year,
                state: CompositeState::NoData,
            });
        }

        log::debug!(
            "Compositing {} observation(s) for year {} with {:?} reducer",
            selected.len(),
            year,
            self.reducer
        );
        let raster = reduce_stack(&selected, &self.geometry, self.reducer, "temporal compositor")?;
        Ok(AnnualComposite {
            year,
            state: CompositeState::Observed(raster),
        })
    }

    /// Composite every year in the inclusive range, in year order.
    ///
    /// Years are independent of each other and are processed in parallel.
    pub fn composite_years(
        &self,
        series: &[TimestampedRaster],
        start_year: i32,
        end_year: i32,
    ) -> ChangeResult<Vec<AnnualComposite>> {
        use rayon::prelude::*;

        if start_year > end_year {
            return Err(ChangeError::Processing(format!(
                "temporal compositor: year range {}..={} is inverted",
                start_year, end_year
            )));
        }

        log::info!(
            "Compositing years {}..={} from {} observation(s)",
            start_year,
            end_year,
            series.len()
        );

        let years: Vec<i32> = (start_year..=end_year).collect();
        let composites: Vec<AnnualComposite> = years
            .par_iter()
            .map(|&year| self.composite_year(series, year))
            .collect::<ChangeResult<Vec<_>>>()?;

        let observed = composites.iter().filter(|c| c.observed().is_some()).count();
        log::info!(
            "Compositing complete: {} year(s), {} with data",
            composites.len(),
            observed
        );
        Ok(composites)
    }
}
