//! Full-run orchestration: compositor → baseline → detector → persistence →
//! {area, first-occurrence}.

use crate::config::AnalysisConfig;
use crate::core::{
    AreaQuantifier, BaselineBuilder, ChangeDetector, FirstOccurrenceResolver, PersistenceFilter,
    TemporalCompositor,
};
use crate::source::{AreaWeights, ObservationSource};
use crate::types::{
    AreaRecord, ChangeResult, ConfirmedChange, Raster, TimestampedRaster,
};

/// Complete, self-contained output of one analysis run.
///
/// Always fully populated: a run over a region with no detectable change
/// returns an all-invalid first-occurrence raster and zero-area records, not
/// a partial result.
#[derive(Debug)]
pub struct AssessmentReport {
    /// Binary reference state over the baseline period
    pub baseline_mask: Raster,
    /// Confirmed persistent change, one raster per confirmed year
    pub confirmed: Vec<ConfirmedChange>,
    /// Ordered per-year change areas, in the area raster's native unit
    pub area_records: Vec<AreaRecord>,
    /// Per-pixel earliest confirmed-change year
    pub first_occurrence: Raster,
}

/// Drives the full detection pipeline for one configuration
pub struct ChangeEngine {
    config: AnalysisConfig,
}

impl ChangeEngine {
    pub fn new(config: AnalysisConfig) -> ChangeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the whole analysis against an observation source and an area
    /// weighting collaborator.
    ///
    /// Source failures propagate as retryable errors; the engine itself
    /// never retries.
    pub fn run(
        &self,
        source: &dyn ObservationSource,
        weights: &dyn AreaWeights,
    ) -> ChangeResult<AssessmentReport> {
        let config = &self.config;
        let (baseline_start, _) = config.baseline_years;
        let (analysis_start, analysis_end) = config.analysis_years;

        let series = self.gather_observations(source)?;

        let compositor = TemporalCompositor::new(config.geometry.clone(), config.reducer);
        let composites = compositor.composite_years(&series, baseline_start, analysis_end)?;

        let baseline = BaselineBuilder::new(
            config.geometry.clone(),
            config.baseline_years.0,
            config.baseline_years.1,
            config.baseline_threshold,
        )
        .build(&composites)?;

        let analysis_composites: Vec<_> = composites
            .iter()
            .filter(|c| c.year >= analysis_start)
            .cloned()
            .collect();

        let detector = ChangeDetector::new(config.geometry.clone(), config.detection_threshold);
        let candidates = detector.detect_years(&analysis_composites, &baseline)?;

        let filter = PersistenceFilter::new(config.geometry.clone(), config.min_run)?;
        let confirmed = filter.confirm(&candidates)?;

        let quantifier = AreaQuantifier::new(weights.pixel_areas(&config.geometry)?, &config.geometry)?;
        let area_records = quantifier.measure_years(&confirmed)?;

        let first_occurrence =
            FirstOccurrenceResolver::new(config.geometry.clone()).resolve(&confirmed)?;

        log::info!(
            "Analysis complete: {} confirmed year(s), {} dated pixel(s)",
            confirmed.len(),
            first_occurrence.valid_count()
        );

        Ok(AssessmentReport {
            baseline_mask: baseline,
            confirmed,
            area_records,
            first_occurrence,
        })
    }

    /// Pull every sensor window from the source and merge into one
    /// time-ordered sequence
    fn gather_observations(
        &self,
        source: &dyn ObservationSource,
    ) -> ChangeResult<Vec<TimestampedRaster>> {
        let mut series = Vec::new();
        for window in &self.config.sensor_windows {
            log::info!(
                "Fetching observations for '{}' ({} to {})",
                window.sensor,
                window.start,
                window.end
            );
            let scenes = source.observations(&self.config.aoi, window.start, window.end)?;
            log::info!("'{}' returned {} scene(s)", window.sensor, scenes.len());
            series.extend(scenes);
        }
        series.sort_by_key(|obs| obs.timestamp);
        Ok(series)
    }
}
