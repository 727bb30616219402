use chrono::NaiveDate;
use itertools::Itertools;
use log::info;

use crate::{
    components::{Collection, DateRange, Footprint, Image, Property, TIME_START},
    config::PipelineConfig,
    errors::{ConfigurationError, Result},
    pipeline::{rescale::encode, views::CollectionViews},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum BandSelection {
    Full,
    /// Good bands only, one median per contiguous run.
    Subset,
}

/// Fixed EMIT study region over Belize, in degrees.
pub fn belize_roi() -> Footprint {
    Footprint::new((-87.28, 15.85), (-89.27, 18.54))
}

/// Median composites of a sensor collection over a region and a date range.
#[derive(Clone, Debug)]
pub struct Compositor {
    views: CollectionViews,
    clip: bool,
}

impl Compositor {
    pub fn new(views: CollectionViews) -> Self {
        Self { views, clip: false }
    }

    pub fn from_config(views: CollectionViews, config: &PipelineConfig) -> Self {
        Self::new(views).clipped(config.clip_composites)
    }

    /// Clip composites to the region they were requested for.
    pub fn clipped(mut self, clip: bool) -> Self {
        self.clip = clip;
        self
    }

    pub fn views(&self) -> &CollectionViews {
        &self.views
    }

    /// Scenes a composite over `roi` and `range` draws from.
    pub fn candidates(&self, roi: Footprint, range: DateRange) -> Collection {
        self.views.full().filter_date(range).filter_bounds(roi)
    }

    /// Encoded per band median of the scenes intersecting `roi` within `range`.
    ///
    /// No matching scene yields a fully masked image with the selected bands.
    /// The acquisition time is the earliest contributing scene's.
    pub fn composite(
        &self,
        roi: Footprint,
        range: DateRange,
        selection: BandSelection,
    ) -> Result<Image> {
        let candidates = self.candidates(roi, range);
        let medians = match selection {
            BandSelection::Full => vec![candidates.median()],
            BandSelection::Subset => self
                .views
                .sensor()
                .good_indexes()
                .contiguous_runs(candidates.band_count())?
                .into_iter()
                .map(|run| Ok(candidates.select(run)?.median()))
                .collect::<Result<Vec<_>>>()?,
        };
        let parts = medians
            .iter()
            .map(encode)
            .map(|part| if self.clip { part.clip(roi) } else { part })
            .collect_vec();
        let first = parts.first().cloned().ok_or(ConfigurationError::NoBands)?;
        let image = Image::cat(parts)?.set(TIME_START, Property::copied(&first, TIME_START));
        info!("new composite {image:?} over {range:?}");
        Ok(image)
    }

    /// Composite of the single day `[date, date + 1 day)`.
    pub fn composite_day(
        &self,
        roi: Footprint,
        date: NaiveDate,
        selection: BandSelection,
    ) -> Result<Image> {
        self.composite(roi, DateRange::day(date), selection)
    }

    /// Full band composite of `date` over [belize_roi], always clipped to it.
    pub fn composite_belize_day(&self, date: NaiveDate) -> Result<Image> {
        self.clone()
            .clipped(true)
            .composite_day(belize_roi(), date, BandSelection::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::PixelType,
        engines::{
            fixtures::{engine, flat, grid, june, ASSET},
            memory::{Grid, MemoryEngine},
            Engine,
        },
        pipeline::rescale::encode_value,
        sensors::SensorBands,
    };
    use chrono::TimeZone;
    use rstest::rstest;

    fn compositor() -> Compositor {
        let sensor = SensorBands::new(
            "FIVE",
            Some(ASSET),
            vec![450., 550., 650., 750., 850.],
            vec![(0, 1), (3, 4)],
        )
        .unwrap();
        Compositor::new(CollectionViews::new(&sensor).unwrap())
    }

    fn scenes() -> MemoryEngine {
        engine(&[
            (june(1), flat(&[0.1, 0.2, 0.3, 0.4, 0.5])),
            (june(2), flat(&[0.3, 0.4, 0.5, 0.6, 0.7])),
            (june(3), flat(&[0.2, 0.9, 0.9, 0.9, 0.9])),
        ])
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test_log::test]
    fn subset_median_is_encoded_per_run() {
        let compositor = compositor();
        let engine = scenes();
        let range = DateRange::days(date(1), date(4)).unwrap();
        let image = compositor
            .composite(*grid().footprint(), range, BandSelection::Subset)
            .unwrap();
        assert_eq!(image.band_names().as_ref(), ["B001", "B002", "B004", "B005"]);
        assert_eq!(image.pixel_type(), PixelType::Int16);
        let raster = engine.compute_pixels(&image).unwrap();
        let expected = [0.2, 0.4, 0.6, 0.7].map(|value| f64::from(encode_value(value)));
        for (band, value) in expected.iter().enumerate() {
            assert_eq!(raster.value(band, 1, 1), Some(*value));
        }
        let values = engine.compute_properties(&image).unwrap();
        assert_eq!(values[TIME_START].as_time(), Some(&june(1)));
    }

    #[test_log::test]
    fn single_day_full_composite_is_the_scene() {
        let compositor = compositor();
        let engine = scenes();
        let image = compositor
            .composite_day(*grid().footprint(), date(2), BandSelection::Full)
            .unwrap();
        assert_eq!(image.band_count(), 5);
        let raster = engine.compute_pixels(&image).unwrap();
        assert_eq!(raster.value(4, 0, 3), Some(7000.));
        let candidates = compositor.candidates(*grid().footprint(), DateRange::day(date(2)));
        assert_eq!(engine.compute_size(&candidates).unwrap(), 1);
    }

    #[rstest]
    #[case(BandSelection::Full, 5)]
    #[case(BandSelection::Subset, 4)]
    fn empty_window_is_fully_masked(#[case] selection: BandSelection, #[case] bands: usize) {
        let engine = scenes();
        let image = compositor()
            .composite_day(*grid().footprint(), date(20), selection)
            .unwrap();
        let raster = engine.compute_pixels(&image).unwrap();
        assert_eq!(raster.shape(), (bands, 4, 4));
        assert!(raster.is_empty_coverage());
        assert!(engine.compute_properties(&image).unwrap().get(TIME_START).is_none());
    }

    #[test_log::test]
    fn scenes_outside_roi_are_skipped_and_clipped() {
        let mut engine = scenes();
        let time = chrono::Utc.with_ymd_and_hms(2024, 6, 2, 18, 0, 0).unwrap();
        engine
            .add_scene(ASSET, "west", time, Footprint::new((0., 0.), (10., 40.)), flat(&[1.; 5]))
            .unwrap();
        let roi = Footprint::new((20., 20.), (40., 40.));
        let image = compositor()
            .clipped(true)
            .composite_day(roi, date(2), BandSelection::Full)
            .unwrap();
        let raster = engine.compute_pixels(&image).unwrap();
        assert_eq!(raster.value(0, 0, 3), Some(3000.));
        assert_eq!(raster.value(0, 3, 0), None);
        assert_eq!(engine.compute_bounds(&image).unwrap(), Some(roi));
    }

    #[rstest]
    fn clip_follows_config() {
        let compositor = compositor();
        let config = PipelineConfig {
            clip_composites: true,
            ..Default::default()
        };
        let clipped = Compositor::from_config(compositor.views().clone(), &config);
        assert!(clipped.clip);
        assert!(!compositor.clip);
    }

    #[test_log::test]
    fn belize_day_is_clipped_to_the_fixed_region() {
        let grid = Grid::new(Footprint::new((-90., 15.), (-86., 19.)), 4, 4);
        let mut engine = MemoryEngine::new(grid);
        engine
            .add_scene(
                ASSET,
                "belize",
                june(1),
                *grid.footprint(),
                flat(&[0.1, 0.2, 0.3, 0.4, 0.5]),
            )
            .unwrap();
        let image = compositor().composite_belize_day(date(1)).unwrap();
        assert_eq!(image.band_count(), 5);

        let raster = engine.compute_pixels(&image).unwrap();
        assert_eq!(raster.value(4, 0, 1), Some(f64::from(encode_value(0.5))));
        assert_eq!(raster.value(0, 0, 0), None);
        assert_eq!(raster.value(0, 3, 1), None);
        assert_eq!(
            engine.compute_bounds(&image).unwrap(),
            Some(Footprint::new((-89., 16.), (-87., 19.)))
        );
    }
}
