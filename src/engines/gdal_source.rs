//! Loads raster files into a [MemoryEngine] through GDAL.

use std::path::Path;

use chrono::{DateTime, Utc};
use gdal::Dataset;
use log::info;
use ndarray::{Array2, Array3, Axis};

use crate::{
    components::Footprint,
    engines::{
        memory::{Grid, MemoryEngine},
        SceneInfo,
    },
    errors::Result,
};

fn footprint_of(dataset: &Dataset) -> Result<Footprint> {
    let (cols, rows) = dataset.raster_size();
    let [left, pixel_width, _, top, _, pixel_height] = dataset.geo_transform()?;
    Ok(Footprint::new(
        (left, top),
        (
            left + cols as f64 * pixel_width,
            top + rows as f64 * pixel_height,
        ),
    ))
}

/// Grid matching the raster at `path`, for building an engine around it.
pub fn grid_of(path: impl AsRef<Path>) -> Result<Grid> {
    let dataset = Dataset::open(path)?;
    let (cols, rows) = dataset.raster_size();
    Ok(Grid::new(footprint_of(&dataset)?, rows, cols))
}

/// Reads every band of `path` as one scene of `asset_id`.
///
/// Samples equal to a band's no-data value become NaN and are masked by
/// the engine. The scene id is the file stem.
pub fn load_scene(
    engine: &mut MemoryEngine,
    asset_id: &str,
    path: impl AsRef<Path>,
    time_start: DateTime<Utc>,
) -> Result<SceneInfo> {
    let path = path.as_ref();
    let dataset = Dataset::open(path)?;
    let (cols, rows) = dataset.raster_size();
    let mut data = Array3::<f64>::zeros((dataset.raster_count(), rows, cols));
    for (index, mut plane) in data.axis_iter_mut(Axis(0)).enumerate() {
        let band = dataset.rasterband(index + 1)?;
        let no_data = band.no_data_value();
        let buffer = band.read_as::<f64>((0, 0), (cols, rows), (cols, rows), None)?;
        let values = Array2::from_shape_vec((rows, cols), buffer.data().to_vec())?;
        plane.assign(&values.mapv(|value| {
            if Some(value) == no_data {
                f64::NAN
            } else {
                value
            }
        }));
    }
    let scene_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("read {} bands from {path:?}", data.dim().0);
    engine.add_scene(
        asset_id,
        &scene_id,
        time_start,
        footprint_of(&dataset)?,
        data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::{
        fixtures::{first_scene, june, ASSET},
        Engine,
    };
    use gdal::{raster::Buffer, DriverManager};
    use rstest::rstest;

    const NO_DATA: f64 = -9999.;

    /// Two band, 2 x 3 GTiff with 10 unit pixels and its north west corner at (100, 200).
    /// Band 2 holds a no-data sample at row 0, col 2.
    fn write_raster(path: &str) -> gdal::errors::Result<()> {
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset = driver.create_with_band_type::<f64, _>(path, 3, 2, 2)?;
        dataset.set_geo_transform(&[100., 10., 0., 200., 0., -10.])?;
        let bands = [
            vec![1., 2., 3., 4., 5., 6.],
            vec![10., 20., NO_DATA, 40., 50., 60.],
        ];
        for (index, values) in bands.into_iter().enumerate() {
            let mut band = dataset.rasterband(index + 1)?;
            band.set_no_data_value(Some(NO_DATA))?;
            band.write((0, 0), (3, 2), &mut Buffer::new((3, 2), values))?;
        }
        Ok(())
    }

    #[rstest]
    fn grid_follows_geo_transform() {
        let path = "/vsimem/reflectio_grid.tif";
        write_raster(path).unwrap();
        let grid = grid_of(path).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.footprint(), &Footprint::new((100., 180.), (130., 200.)));
        assert_eq!(grid.scale(), 10.);
    }

    #[test_log::test]
    fn scene_masks_no_data_and_is_named_by_stem() {
        let path = "/vsimem/reflectio_scene.tif";
        write_raster(path).unwrap();
        let mut engine = MemoryEngine::new(grid_of(path).unwrap());
        let info = load_scene(&mut engine, ASSET, path, june(1)).unwrap();
        assert_eq!(info.id.as_ref(), "reflectio_scene");
        assert_eq!(info.asset_id.as_ref(), ASSET);
        assert_eq!(info.time_start, june(1));
        assert_eq!(info.footprint, Footprint::new((100., 180.), (130., 200.)));
        assert_eq!(engine.scenes(ASSET).unwrap(), vec![info]);

        let raster = engine.compute_pixels(&first_scene(&engine, 2)).unwrap();
        assert_eq!(raster.shape(), (2, 2, 3));
        assert_eq!(raster.value(0, 0, 2), Some(3.));
        assert_eq!(raster.value(1, 0, 2), None);
        assert_eq!(raster.value(1, 1, 0), Some(40.));
        assert_eq!(raster.value(0, 1, 2), Some(6.));
    }
}
