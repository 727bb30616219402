//! Lazy compositing and band analysis of hyperspectral reflectance collections.
//!
//! Images, collections and arrays are immutable computation graphs; an
//! [engines::Engine] realises them on request.

mod components;
pub mod config;
pub mod engines;
mod errors;
mod indexes;
mod intersection;
pub mod pipeline;
pub mod sensors;

pub use components::{
    Array, ArrayExpr, ArrayUnary, BinaryOp, Collection, CollectionExpr, DateRange, Footprint,
    Image, ImageExpr, PixelType, Properties, Property, PropertyValue, PropertyValues, Region,
    RegionReducer, Scale, TemporalReducer, SCENE_ID, TIME_START,
};
pub use config::{PipelineConfig, ReduceOptions};
pub use errors::{ConfigurationError, ReflectioError, Result};
pub use indexes::Indexes;
pub use intersection::{Intersection, IntersectionError};

use geo::{Coord, CoordNum};

pub(crate) trait CoordUtils<T: CoordNum> {
    /// Applies `op` to the x and y components pairwise.
    fn operate(&self, other: &Coord<T>, op: impl Fn(T, T) -> T) -> Coord<T>;
}

impl<T: CoordNum> CoordUtils<T> for Coord<T> {
    fn operate(&self, other: &Coord<T>, op: impl Fn(T, T) -> T) -> Coord<T> {
        Coord {
            x: op(self.x, other.x),
            y: op(self.y, other.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use engines::{
        memory::{Grid, MemoryEngine},
        Engine,
    };
    use ndarray::Array3;
    use pipeline::{
        decode, encode_value, normalize, pca, variance_report, BandSelection, CollectionViews,
        Compositor,
    };
    use sensors::SensorBands;

    const ASSET: &str = "SYNTHETIC/HYPER";

    /// 400 to 1400 nm every 5 nm, bands 100 to 150 excluded.
    fn synthetic_sensor() -> SensorBands {
        let wavelengths = (0..=200).map(|idx| 400. + 5. * idx as f64).collect();
        SensorBands::new("SYNTHETIC", Some(ASSET), wavelengths, vec![(0, 99), (151, 200)]).unwrap()
    }

    fn reflectance(band: usize) -> f64 {
        0.01 + 0.004 * band as f64
    }

    fn acquired() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 14, 11, 30, 0).unwrap()
    }

    fn grid() -> Grid {
        Grid::new(Footprint::new((0., 0.), (300., 300.)), 10, 10)
    }

    fn single_scene_engine(sensor: &SensorBands) -> MemoryEngine {
        let mut engine = MemoryEngine::new(grid());
        let data = Array3::from_shape_fn((sensor.band_count(), 10, 10), |(band, _, _)| {
            reflectance(band)
        });
        engine
            .add_scene(ASSET, "only", acquired(), *grid().footprint(), data)
            .unwrap();
        engine
    }

    #[test_log::test]
    fn good_indices_drop_the_bad_range() {
        let sensor = synthetic_sensor();
        let indices = sensor.good_indices();
        assert_eq!(sensor.band_count(), 201);
        assert_eq!(indices.len(), sensor.band_count() - 51);
        assert!(indices.iter().all(|idx| !(100..=150).contains(idx)));
        assert_eq!(sensor.wavelength(151).unwrap(), 1155.);
    }

    #[test_log::test]
    fn single_scene_day_composite_is_the_encoded_scene() {
        let sensor = synthetic_sensor();
        let engine = single_scene_engine(&sensor);
        let compositor = Compositor::new(CollectionViews::new(&sensor).unwrap());
        let roi = Footprint::new((30., 30.), (150., 150.));
        let image = compositor
            .composite_day(roi, NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(), BandSelection::Subset)
            .unwrap();
        assert_eq!(image.band_count(), 150);

        let raster = engine.compute_pixels(&image).unwrap();
        for (band, index) in sensor.good_indices().iter().enumerate() {
            let expected = f64::from(encode_value(reflectance(*index)));
            assert_eq!(raster.value(band, 5, 5), Some(expected));
        }
        let values = engine.compute_properties(&image).unwrap();
        assert_eq!(values[TIME_START].as_time(), Some(&acquired()));
    }

    #[test_log::test]
    fn composite_without_scenes_is_empty_coverage() {
        let sensor = synthetic_sensor();
        let engine = single_scene_engine(&sensor);
        let compositor = Compositor::new(CollectionViews::new(&sensor).unwrap()).clipped(true);
        let roi = *grid().footprint();
        let image = compositor
            .composite_day(roi, NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(), BandSelection::Subset)
            .unwrap();
        let raster = engine.compute_pixels(&image).unwrap();
        assert_eq!(raster.shape(), (150, 10, 10));
        assert!(raster.is_empty_coverage());
        assert_eq!(engine.compute_bounds(&image).unwrap(), None);
    }

    #[test_log::test]
    fn inverted_window_is_rejected() {
        let first = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 7, 14).unwrap();
        assert!(matches!(
            DateRange::days(first, last),
            Err(ReflectioError::Configuration(ConfigurationError::InvalidDateRange { .. }))
        ));
    }

    #[test_log::test]
    fn composite_normalize_pca_chain() {
        let sensor = SensorBands::new(
            "SIX",
            Some(ASSET),
            vec![450., 500., 550., 600., 650., 700.],
            vec![(0, 1), (3, 5)],
        )
        .unwrap();
        let mut engine = MemoryEngine::new(grid());
        for (day, hour) in [(14, 9), (14, 12), (14, 15)] {
            let data = Array3::from_shape_fn((6, 10, 10), |(band, row, col)| {
                let pattern = (row * (band + 1) + col * (band + 2) + hour) % 7;
                0.05 + 0.1 * pattern as f64
            });
            let time = Utc.with_ymd_and_hms(2024, 7, day, hour as u32, 0, 0).unwrap();
            engine
                .add_scene(ASSET, &format!("h{hour}"), time, *grid().footprint(), data)
                .unwrap();
        }
        let config = PipelineConfig::default();
        let compositor = Compositor::from_config(CollectionViews::new(&sensor).unwrap(), &config);
        let composite = compositor
            .composite_day(
                *grid().footprint(),
                NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
                BandSelection::Subset,
            )
            .unwrap();
        let normalized = normalize(&decode(&composite), &config).unwrap();
        let raster = engine.compute_pixels(&normalized).unwrap();
        assert!(raster.data.iter().all(|value| (0. ..=1.).contains(value)));

        let components = pca(&normalized, &config).unwrap();
        assert_eq!(
            components.band_names().as_ref(),
            ["pc1", "pc2", "pc3", "pc4", "pc5"]
        );
        let report = variance_report(&components, &engine).unwrap();
        let total: f64 = report.values().map(|value| value.parse::<f64>().unwrap()).sum();
        assert!((total - 100.).abs() <= 0.05);
        assert_eq!(report, variance_report(&pca(&normalized, &config).unwrap(), &engine).unwrap());
        let values = engine.compute_properties(&components).unwrap();
        assert_eq!(
            values[TIME_START].as_time(),
            Some(&Utc.with_ymd_and_hms(2024, 7, 14, 9, 0, 0).unwrap())
        );
    }
}
