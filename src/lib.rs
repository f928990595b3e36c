//! forestwatch: a temporal compositing and persistent-change-detection engine
//!
//! This library turns decades of irregular, validity-masked satellite raster
//! observations over a fixed region into per-year composites, a baseline
//! reference state, persistence-filtered change events, per-year change
//! areas, and a per-pixel year-of-first-change raster.

pub mod types;
pub mod source;
pub mod config;
pub mod core;
pub mod pipeline;

// Re-export main types and functions for easier access
pub use types::{
    AnnualComposite, AreaRecord, BoundingBox, CandidateChange, ChangeError, ChangeResult,
    CompositeState, ConfirmedChange, GeoTransform, Raster, RasterGeometry, TimestampedRaster,
};

pub use config::{AnalysisConfig, SensorWindow};
pub use core::{
    AreaQuantifier, BaselineBuilder, ChangeDetector, FirstOccurrenceResolver, PersistenceFilter,
    Reducer, TemporalCompositor,
};
pub use pipeline::{AssessmentReport, ChangeEngine};
pub use source::{AreaWeights, ObservationSource};
