use chrono::{DateTime, TimeZone, Utc};
use ndarray::Array2;

use forestwatch::{
    AnalysisConfig, AreaWeights, BoundingBox, ChangeEngine, ChangeResult, GeoTransform,
    ObservationSource, Raster, RasterGeometry, Reducer, SensorWindow, TimestampedRaster,
};

const CELL_AREA: f32 = 900.0; // 30 m pixels

fn grid() -> RasterGeometry {
    RasterGeometry {
        rows: 5,
        cols: 5,
        geo_transform: GeoTransform {
            top_left_x: 500_000.0,
            pixel_width: 30.0,
            rotation_x: 0.0,
            top_left_y: 8_900_000.0,
            rotation_y: 0.0,
            pixel_height: -30.0,
        },
        epsg: 32720,
    }
}

fn aoi() -> BoundingBox {
    BoundingBox {
        min_lon: -62.0,
        max_lon: -61.9,
        min_lat: -10.1,
        max_lat: -10.0,
    }
}

/// One synthetic scene: every pixel at `background`, pixel (2,2) at `center`
fn scene(year: i32, background: f32, center: f32) -> TimestampedRaster {
    let mut data = Array2::from_elem((5, 5), background);
    data[[2, 2]] = center;
    TimestampedRaster {
        timestamp: Utc.with_ymd_and_hms(year, 7, 1, 10, 0, 0).unwrap(),
        raster: Raster::new(grid(), data).unwrap(),
    }
}

struct SyntheticScenes {
    scenes: Vec<TimestampedRaster>,
}

impl ObservationSource for SyntheticScenes {
    fn observations(
        &self,
        _aoi: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ChangeResult<Vec<TimestampedRaster>> {
        Ok(self
            .scenes
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .cloned()
            .collect())
    }
}

struct UniformAreas;

impl AreaWeights for UniformAreas {
    fn pixel_areas(&self, geometry: &RasterGeometry) -> ChangeResult<Raster> {
        Ok(Raster::filled(geometry.clone(), CELL_AREA))
    }
}

fn config(analysis_end: i32) -> AnalysisConfig {
    AnalysisConfig {
        aoi: aoi(),
        sensor_windows: vec![SensorWindow {
            sensor: "landsat-5".to_string(),
            start: Utc.with_ymd_and_hms(1984, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(analysis_end, 12, 31, 23, 59, 59).unwrap(),
        }],
        geometry: grid(),
        baseline_years: (1984, 1990),
        analysis_years: (1991, analysis_end),
        baseline_threshold: 0.6,
        detection_threshold: 0.4,
        min_run: 2,
        reducer: Reducer::Median,
    }
}

/// Baseline scenes 1984-1990: only pixel (2,2) is above the baseline
/// threshold
fn baseline_scenes() -> Vec<TimestampedRaster> {
    (1984..=1990).map(|y| scene(y, 0.3, 0.8)).collect()
}

#[test]
fn clearing_confirmed_for_first_year_of_two_year_run() {
    let _ = env_logger::builder().is_test(true).try_init();

    // (2,2) drops below the detection threshold in 1991 and 1992, then
    // recovers in 1993
    let mut scenes = baseline_scenes();
    scenes.push(scene(1991, 0.3, 0.1));
    scenes.push(scene(1992, 0.3, 0.1));
    scenes.push(scene(1993, 0.3, 0.8));

    let engine = ChangeEngine::new(config(1993)).unwrap();
    let report = engine
        .run(&SyntheticScenes { scenes }, &UniformAreas)
        .unwrap();

    // Baseline mask holds exactly the one above-threshold pixel
    assert_eq!(report.baseline_mask.true_count(), 1);
    assert!((report.baseline_mask.data[[2, 2]] - 1.0).abs() < 1e-6);

    // Confirmations exist for window starts 1991 and 1992, but only the
    // 1991-1992 pair actually holds
    let confirmed_years: Vec<i32> = report
        .confirmed
        .iter()
        .filter(|c| c.raster.true_count() > 0)
        .map(|c| c.year)
        .collect();
    assert_eq!(confirmed_years, vec![1991]);

    // First-occurrence raster dates (2,2) to 1991 and nothing else
    assert!((report.first_occurrence.data[[2, 2]] - 1991.0).abs() < 1e-6);
    assert_eq!(report.first_occurrence.valid_count(), 1);

    // One pixel's ground area in 1991, zero afterwards
    let by_year = |year: i32| {
        report
            .area_records
            .iter()
            .find(|r| r.year == year)
            .map(|r| r.area)
    };
    assert!((by_year(1991).unwrap() - CELL_AREA as f64).abs() < 1e-6);
    assert_eq!(by_year(1992).unwrap(), 0.0);
    assert_eq!(by_year(1993), None);
}

#[test]
fn missing_middle_year_blocks_confirmation() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Same setup, but 1992 has no observations at all: the 1991 candidate
    // has no consecutive partner and nothing is ever confirmed
    let mut scenes = baseline_scenes();
    scenes.push(scene(1991, 0.3, 0.1));
    scenes.push(scene(1993, 0.3, 0.8));

    let engine = ChangeEngine::new(config(1993)).unwrap();
    let report = engine
        .run(&SyntheticScenes { scenes }, &UniformAreas)
        .unwrap();

    assert!(report.confirmed.iter().all(|c| c.raster.true_count() == 0));
    assert_eq!(report.first_occurrence.valid_count(), 0);
    assert!(report.area_records.iter().all(|r| r.area == 0.0));
}

#[test]
fn pipeline_is_deterministic() {
    let mut scenes = baseline_scenes();
    scenes.push(scene(1991, 0.3, 0.1));
    scenes.push(scene(1992, 0.3, 0.1));
    scenes.push(scene(1993, 0.3, 0.8));
    let source = SyntheticScenes { scenes };

    let engine = ChangeEngine::new(config(1993)).unwrap();
    let first = engine.run(&source, &UniformAreas).unwrap();
    let second = engine.run(&source, &UniformAreas).unwrap();

    for (a, b) in first
        .first_occurrence
        .data
        .iter()
        .zip(second.first_occurrence.data.iter())
    {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(first.area_records, second.area_records);
}

#[test]
fn empty_source_produces_complete_degenerate_report() {
    // No observations anywhere: all-invalid baseline, no confirmations, all
    // areas zero; still a complete well-typed report
    let engine = ChangeEngine::new(config(1993)).unwrap();
    let report = engine
        .run(&SyntheticScenes { scenes: Vec::new() }, &UniformAreas)
        .unwrap();

    assert_eq!(report.baseline_mask.valid_count(), 0);
    assert!(report.confirmed.iter().all(|c| c.raster.true_count() == 0));
    assert_eq!(report.first_occurrence.valid_count(), 0);
    assert!(report.area_records.iter().all(|r| r.area == 0.0));
}
