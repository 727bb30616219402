use std::sync::Arc;

use log::info;

use crate::{
    components::{
        Array, ArrayUnary, Image, Property, Region, RegionReducer, Scale, TIME_START,
    },
    config::PipelineConfig,
    errors::Result,
};

/// Comma separated names of bands whose spread was at or below
/// [PipelineConfig::degenerate_tolerance].
pub const DEGENERATE_BANDS: &str = "degenerate_bands";

/// Per band min-max stretch over the image's own valid footprint.
///
/// Extrema are computed at the image's nominal scale with
/// [PipelineConfig::normalize] options; with `best_effort` they may be taken
/// from a coarser sampling. A band with no spread maps to all zeros and is
/// listed under [DEGENERATE_BANDS].
pub fn normalize(image: &Image, config: &PipelineConfig) -> Result<Image> {
    let extreme = |reducer| {
        Array::region_reduce(
            image,
            reducer,
            Region::BoundsOf(image.clone()),
            Scale::NominalOf(image.clone()),
            config.normalize,
        )
    };
    let (min, max) = (extreme(RegionReducer::Min), extreme(RegionReducer::Max));
    let spread = max.subtract(&min);
    let divisor = spread.unary(ArrayUnary::ReplaceNearZero {
        tolerance: config.degenerate_tolerance,
        value: 1.,
    });

    let names = image.band_names();
    let normalized = image
        .subtract(&Image::constant_array(min, Arc::clone(names))?)?
        .divide(&Image::constant_array(divisor, Arc::clone(names))?)?
        .set(TIME_START, Property::copied(image, TIME_START))
        .set(
            DEGENERATE_BANDS,
            Property::NearZero {
                values: spread,
                labels: Arc::clone(names),
                tolerance: config.degenerate_tolerance,
            },
        );
    info!("new normalization {normalized:?}");
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::Footprint,
        engines::{
            fixtures::{band_names, engine, first_scene, flat, june, ramp, ASSET},
            memory::MemoryEngine,
            Engine,
        },
    };
    use ndarray::{concatenate, Axis};

    #[test_log::test]
    fn bands_are_stretched_independently() {
        let engine = engine(&[(june(1), ramp(2))]);
        let image = normalize(&first_scene(&engine, 2), &PipelineConfig::default()).unwrap();
        let raster = engine.compute_pixels(&image).unwrap();
        for band in 0..2 {
            assert_eq!(raster.value(band, 0, 0), Some(0.));
            assert_eq!(raster.value(band, 3, 3), Some(1.));
            assert!((raster.value(band, 1, 2).unwrap() - 6. / 15.).abs() < 1e-12);
        }
        let values = engine.compute_properties(&image).unwrap();
        assert_eq!(values[DEGENERATE_BANDS].as_text(), Some(""));
        assert_eq!(values[TIME_START].as_time(), Some(&june(1)));
    }

    #[test_log::test]
    fn constant_band_becomes_zero_and_is_flagged() {
        let data = concatenate(Axis(0), &[ramp(1).view(), flat(&[0.25]).view()]).unwrap();
        let engine = engine(&[(june(1), data)]);
        let image = normalize(&first_scene(&engine, 2), &PipelineConfig::default()).unwrap();
        let raster = engine.compute_pixels(&image).unwrap();
        assert!(raster.mask.iter().all(|valid| *valid));
        assert!(raster.band("B002").unwrap().iter().all(|value| *value == 0.));
        let values = engine.compute_properties(&image).unwrap();
        assert_eq!(values[DEGENERATE_BANDS].as_text(), Some("B002"));
    }

    #[test_log::test]
    fn extrema_come_from_valid_footprint_only() {
        let mut engine = MemoryEngine::new(crate::engines::fixtures::grid());
        let mut data = ramp(1);
        data[[0, 3, 3]] = f64::NAN;
        let info = engine
            .add_scene(ASSET, "s", june(1), Footprint::new((0., 0.), (40., 40.)), data)
            .unwrap();
        let scene = Image::scene(info, band_names(1), crate::components::PixelType::Float64);
        let raster = engine
            .compute_pixels(&normalize(&scene, &PipelineConfig::default()).unwrap())
            .unwrap();
        assert_eq!(raster.value(0, 3, 2), Some(1.));
        assert_eq!(raster.value(0, 3, 3), None);
    }
}
