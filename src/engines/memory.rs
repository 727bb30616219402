use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use geo::Coord;
use itertools::Itertools;
use log::{debug, info, warn};
use ndarray::{concatenate, s, stack, Array2, Array3, ArrayView2, Axis, Zip};
use num_traits::AsPrimitive;
use rayon::prelude::*;

use crate::{
    components::{
        Array, ArrayExpr, Footprint, Image, ImageExpr, PixelType, Region, RegionReducer, Scale,
        TemporalReducer,
    },
    config::ReduceOptions,
    engines::{jacobi, Engine, EngineError, Raster, SceneInfo},
    errors::Result,
    intersection::Intersection,
};

/// Pixel grid shared by every scene of a [MemoryEngine].
///
/// Row 0 is the northern edge; a pixel belongs to a footprint when its
/// center does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    footprint: Footprint,
    rows: usize,
    cols: usize,
}

impl Grid {
    pub fn new(footprint: Footprint, rows: usize, cols: usize) -> Self {
        Self {
            footprint,
            rows,
            cols,
        }
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Nominal ground sample distance.
    pub fn scale(&self) -> f64 {
        self.pixel_size().x
    }

    fn pixel_size(&self) -> Coord<f64> {
        Coord {
            x: self.footprint.width() / self.cols as f64,
            y: self.footprint.height() / self.rows as f64,
        }
    }

    fn pixel_center(&self, row: usize, col: usize) -> Coord<f64> {
        self.cell_center(row as isize, col as isize)
    }

    /// Center of a cell, which may lie off the grid.
    fn cell_center(&self, row: isize, col: isize) -> Coord<f64> {
        let size = self.pixel_size();
        Coord {
            x: self.footprint.min().x + (col as f64 + 0.5) * size.x,
            y: self.footprint.max().y - (row as f64 + 0.5) * size.y,
        }
    }

    /// Pixels of `footprint` with a cell outside it at most `width` rows and columns away.
    fn outline(&self, footprint: &Footprint, width: usize) -> Array2<bool> {
        let reach = width as isize;
        Array2::from_shape_fn((self.rows, self.cols), |(row, col)| {
            let (row, col) = (row as isize, col as isize);
            footprint.contains(self.cell_center(row, col))
                && (-reach..=reach)
                    .cartesian_product(-reach..=reach)
                    .any(|(dr, dc)| !footprint.contains(self.cell_center(row + dr, col + dc)))
        })
    }

    fn coverage(&self, footprint: &Footprint) -> Array2<bool> {
        Array2::from_shape_fn((self.rows, self.cols), |(row, col)| {
            footprint.contains(self.pixel_center(row, col))
        })
    }

    /// Footprint spanned by the cells flagged in `valid`.
    fn bounds_of(&self, valid: ArrayView2<bool>) -> Option<Footprint> {
        let (min_row, max_row, min_col, max_col) = valid
            .indexed_iter()
            .filter(|(_, valid)| **valid)
            .map(|(idx, _)| idx)
            .fold(None, |span: Option<(usize, usize, usize, usize)>, (row, col)| {
                Some(match span {
                    None => (row, row, col, col),
                    Some((r0, r1, c0, c1)) => (r0.min(row), r1.max(row), c0.min(col), c1.max(col)),
                })
            })?;
        let size = self.pixel_size();
        let (left, top) = (self.footprint.min().x, self.footprint.max().y);
        Some(Footprint::new(
            (
                left + min_col as f64 * size.x,
                top - (max_row + 1) as f64 * size.y,
            ),
            (
                left + (max_col + 1) as f64 * size.x,
                top - min_row as f64 * size.y,
            ),
        ))
    }

    /// Pixels of `inside` on every `step`th row and column.
    fn sample(&self, inside: &Array2<bool>, step: usize) -> Vec<(usize, usize)> {
        (0..self.rows)
            .step_by(step)
            .cartesian_product((0..self.cols).step_by(step))
            .filter(|idx| inside[*idx])
            .collect()
    }
}

#[derive(Debug)]
struct MemoryScene {
    info: SceneInfo,
    data: Arc<Array3<f64>>,
}

/// Engine evaluating graphs eagerly over in-memory scenes on a single [Grid].
///
/// Non finite scene samples and pixels outside a scene's footprint are masked.
#[derive(Debug)]
pub struct MemoryEngine {
    grid: Grid,
    scenes: HashMap<String, Vec<MemoryScene>>,
}

type Plane = (Array2<f64>, Array2<bool>);

impl MemoryEngine {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            scenes: HashMap::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Adds a `(bands, rows, cols)` scene to the collection `asset_id`.
    pub fn add_scene(
        &mut self,
        asset_id: &str,
        scene_id: &str,
        time_start: DateTime<Utc>,
        footprint: Footprint,
        data: Array3<f64>,
    ) -> Result<SceneInfo> {
        let (bands, rows, cols) = data.dim();
        if (rows, cols) != self.grid.shape() {
            Err(EngineError::ShapeMismatch {
                what: "scene",
                expected: vec![bands, self.grid.rows, self.grid.cols],
                actual: vec![bands, rows, cols],
            })?
        }
        let scenes = self.scenes.entry(asset_id.into()).or_default();
        if let Some(first) = scenes.first() {
            if first.data.dim().0 != bands {
                Err(EngineError::ShapeMismatch {
                    what: "scene bands",
                    expected: vec![first.data.dim().0],
                    actual: vec![bands],
                })?
            }
        }
        let info = SceneInfo {
            asset_id: Arc::from(asset_id),
            id: Arc::from(scene_id),
            time_start,
            footprint,
        };
        scenes.push(MemoryScene {
            info: info.clone(),
            data: Arc::new(data),
        });
        info!("new scene {info:?}");
        Ok(info)
    }

    fn scene(&self, info: &SceneInfo) -> Result<&MemoryScene> {
        self.scenes
            .get(info.asset_id.as_ref())
            .and_then(|scenes| scenes.iter().find(|scene| scene.info.id == info.id))
            .ok_or_else(|| EngineError::UnknownScene(info.id.to_string()).into())
    }

    fn raster(&self, image: &Image, data: Array3<f64>, mask: Array3<bool>) -> Raster {
        Raster {
            band_names: Arc::clone(image.band_names()),
            pixel_type: image.pixel_type(),
            data,
            mask,
        }
    }

    fn stack_planes(&self, image: &Image, planes: Vec<Plane>) -> Result<Raster> {
        let data = stack(Axis(0), &planes.iter().map(|(data, _)| data.view()).collect_vec())?;
        let mask = stack(Axis(0), &planes.iter().map(|(_, mask)| mask.view()).collect_vec())?;
        Ok(self.raster(image, data, mask))
    }

    fn check_bands(&self, what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            Err(EngineError::ShapeMismatch {
                what,
                expected: vec![expected],
                actual: vec![actual],
            })?
        }
        Ok(())
    }

    fn evaluate(&self, image: &Image) -> Result<Raster> {
        debug!("evaluating {image:?}");
        let (rows, cols) = self.grid.shape();
        let bands = image.band_count();
        match image.expr() {
            ImageExpr::Scene(info) => {
                let scene = self.scene(info)?;
                self.check_bands("scene bands", bands, scene.data.dim().0)?;
                let coverage = self.grid.coverage(&info.footprint);
                let data = (*scene.data).clone();
                let mask = Array3::from_shape_fn(data.dim(), |(band, row, col)| {
                    coverage[[row, col]] && data[[band, row, col]].is_finite()
                });
                Ok(self.raster(image, data, mask))
            }
            ImageExpr::Constant(array) => {
                let values = self.compute_array(array)?;
                self.check_bands("constant values", bands, values.len())?;
                let values = values.iter().copied().collect_vec();
                let data = Array3::from_shape_fn((bands, rows, cols), |(band, _, _)| values[band]);
                Ok(self.raster(image, data, Array3::from_elem((bands, rows, cols), true)))
            }
            ImageExpr::Select { input, indexes } => {
                let raster = self.evaluate(input)?;
                Ok(self.raster(
                    image,
                    raster.data.select(Axis(0), indexes),
                    raster.mask.select(Axis(0), indexes),
                ))
            }
            ImageExpr::Cat(parts) => {
                let rasters = parts
                    .par_iter()
                    .map(|part| self.evaluate(part))
                    .collect::<Result<Vec<_>>>()?;
                let data = concatenate(
                    Axis(0),
                    &rasters.iter().map(|raster| raster.data.view()).collect_vec(),
                )?;
                let mask = concatenate(
                    Axis(0),
                    &rasters.iter().map(|raster| raster.mask.view()).collect_vec(),
                )?;
                Ok(self.raster(image, data, mask))
            }
            ImageExpr::Binary { op, lhs, rhs } => {
                let (lhs, rhs) = rayon::join(|| self.evaluate(lhs), || self.evaluate(rhs));
                let (lhs, rhs) = (lhs?, rhs?);
                let band_of = |raster: &Raster, band: usize| {
                    if raster.shape().0 == 1 {
                        0
                    } else {
                        band
                    }
                };
                let planes = (0..bands)
                    .into_par_iter()
                    .map(|band| {
                        let (lhs_band, rhs_band) = (band_of(&lhs, band), band_of(&rhs, band));
                        let mut data = Array2::<f64>::zeros((rows, cols));
                        let mut mask = Array2::from_elem((rows, cols), false);
                        Zip::from(&mut data)
                            .and(&mut mask)
                            .and(lhs.data.index_axis(Axis(0), lhs_band))
                            .and(lhs.mask.index_axis(Axis(0), lhs_band))
                            .and(rhs.data.index_axis(Axis(0), rhs_band))
                            .and(rhs.mask.index_axis(Axis(0), rhs_band))
                            .for_each(|out, valid, &lhs, &lhs_valid, &rhs, &rhs_valid| {
                                if let Some(value) =
                                    op.apply(lhs, rhs).filter(|_| lhs_valid && rhs_valid)
                                {
                                    *out = value;
                                    *valid = true;
                                }
                            });
                        (data, mask)
                    })
                    .collect();
                self.stack_planes(image, planes)
            }
            ImageExpr::Cast { input, pixel_type } => {
                let raster = self.evaluate(input)?;
                let data = match pixel_type {
                    PixelType::Int16 => raster
                        .data
                        .mapv(|value| f64::from(<f64 as AsPrimitive<i16>>::as_(value))),
                    PixelType::Float64 => raster.data,
                };
                Ok(self.raster(image, data, raster.mask))
            }
            ImageExpr::Unmask { input, fill } => {
                let mut raster = self.evaluate(input)?;
                Zip::from(&mut raster.data)
                    .and(&raster.mask)
                    .for_each(|value, &valid| {
                        if !valid {
                            *value = *fill
                        }
                    });
                let mask = Array3::from_elem(raster.mask.dim(), true);
                Ok(self.raster(image, raster.data, mask))
            }
            ImageExpr::UpdateMask { input, mask } => {
                let (raster, mask) = rayon::join(|| self.evaluate(input), || self.evaluate(mask));
                let (mut raster, mask) = (raster?, mask?);
                let broadcast = mask.shape().0 == 1;
                for (band, mut band_mask) in raster.mask.axis_iter_mut(Axis(0)).enumerate() {
                    let source = mask
                        .mask
                        .index_axis(Axis(0), if broadcast { 0 } else { band });
                    Zip::from(&mut band_mask)
                        .and(&source)
                        .for_each(|valid, &keep| *valid &= keep);
                }
                Ok(self.raster(image, raster.data, raster.mask))
            }
            ImageExpr::Clip { input, roi } => {
                let mut raster = self.evaluate(input)?;
                let coverage = self.grid.coverage(roi);
                for mut band_mask in raster.mask.axis_iter_mut(Axis(0)) {
                    Zip::from(&mut band_mask)
                        .and(&coverage)
                        .for_each(|valid, &inside| *valid &= inside);
                }
                Ok(self.raster(image, raster.data, raster.mask))
            }
            ImageExpr::Reduce {
                collection,
                reducer,
            } => {
                let rasters = self
                    .compute_images(collection)?
                    .par_iter()
                    .map(|image| self.evaluate(image))
                    .collect::<Result<Vec<_>>>()?;
                for raster in rasters.iter() {
                    self.check_bands("reduced image bands", bands, raster.shape().0)?;
                }
                debug!("reducing {} images", rasters.len());
                match reducer {
                    TemporalReducer::Median => self.median(image, &rasters),
                }
            }
            ImageExpr::Outline { roi, width } => {
                let mask = self.grid.outline(roi, *width).insert_axis(Axis(0));
                Ok(self.raster(image, Array3::<f64>::zeros((1, rows, cols)), mask))
            }
            ImageExpr::MatrixProject { input, matrix } => {
                let (raster, matrix) =
                    rayon::join(|| self.evaluate(input), || self.compute_array(matrix));
                let (raster, matrix) = (raster?, matrix?);
                let inputs = raster.shape().0;
                if matrix.dim() != (bands, inputs) {
                    Err(EngineError::ShapeMismatch {
                        what: "projection matrix",
                        expected: vec![bands, inputs],
                        actual: matrix.shape().to_vec(),
                    })?
                }
                let pixels = raster.data.to_shape((inputs, rows * cols))?;
                let data = matrix
                    .dot(&pixels)
                    .into_shape_with_order((bands, rows, cols))?;
                let valid = raster
                    .mask
                    .map_axis(Axis(0), |pixel| pixel.iter().all(|valid| *valid));
                let mask = Array3::from_shape_fn((bands, rows, cols), |(_, row, col)| {
                    valid[[row, col]]
                });
                Ok(self.raster(image, data, mask))
            }
        }
    }

    fn median(&self, image: &Image, rasters: &[Raster]) -> Result<Raster> {
        let (rows, cols) = self.grid.shape();
        let planes = (0..image.band_count())
            .into_par_iter()
            .map(|band| {
                let mut data = Array2::<f64>::zeros((rows, cols));
                let mut mask = Array2::from_elem((rows, cols), false);
                for ((row, col), value) in data.indexed_iter_mut() {
                    let mut samples = rasters
                        .iter()
                        .filter_map(|raster| raster.value(band, row, col))
                        .collect_vec();
                    if let Some(median) = median_of(&mut samples) {
                        *value = median;
                        mask[[row, col]] = true;
                    }
                }
                (data, mask)
            })
            .collect();
        self.stack_planes(image, planes)
    }

    fn resolve_region(&self, region: &Region) -> Result<Option<Footprint>> {
        match region {
            Region::Footprint(footprint) => Ok(Some(*footprint)),
            Region::BoundsOf(image) => self.compute_bounds(image),
        }
    }

    fn resolve_scale(&self, scale: &Scale) -> f64 {
        match scale {
            Scale::Meters(meters) => *meters,
            Scale::NominalOf(_) => self.grid.scale(),
        }
    }

    fn region_reduce(
        &self,
        image: &Image,
        reducer: RegionReducer,
        region: &Region,
        scale: &Scale,
        options: &ReduceOptions,
    ) -> Result<Array2<f64>> {
        let raster = self.evaluate(image)?;
        let bands = raster.shape().0;
        let inside = match self.resolve_region(region)? {
            Some(footprint) => self.grid.coverage(&footprint),
            None => Array2::from_elem(self.grid.shape(), false),
        };

        let mut step = (self.resolve_scale(scale) / self.grid.scale())
            .round()
            .max(1.) as usize;
        let mut pixels = self.grid.sample(&inside, step);
        let coarsest = self.grid.rows.max(self.grid.cols);
        while pixels.len() as f64 > options.max_pixels {
            if !options.best_effort || step >= coarsest {
                Err(EngineError::TooManyPixels {
                    pixels: pixels.len(),
                    max_pixels: options.max_pixels,
                })?
            }
            step *= 2;
            warn!("best effort {reducer:?} sampling every {step} pixels");
            pixels = self.grid.sample(&inside, step);
        }
        debug!("{reducer:?} over {} pixels", pixels.len());

        let raster = &raster;
        let band_values = |band: usize| {
            pixels
                .iter()
                .filter_map(move |(row, col)| raster.value(band, *row, *col))
        };
        let row = |fold: &dyn Fn(usize) -> Option<f64>| {
            Array2::from_shape_fn((1, bands), |(_, band)| fold(band).unwrap_or(f64::NAN))
        };
        Ok(match reducer {
            RegionReducer::Mean => row(&|band| {
                let (sum, count) = band_values(band)
                    .fold((0., 0usize), |(sum, count), value| (sum + value, count + 1));
                (count > 0).then(|| sum / count as f64)
            }),
            RegionReducer::Min => row(&|band| band_values(band).reduce(f64::min)),
            RegionReducer::Max => row(&|band| band_values(band).reduce(f64::max)),
            RegionReducer::CenteredCovariance => {
                let complete = pixels
                    .iter()
                    .filter(|(row, col)| {
                        (0..bands).all(|band| raster.value(band, *row, *col).is_some())
                    })
                    .collect_vec();
                covariance(&Array2::from_shape_fn(
                    (complete.len(), bands),
                    |(sample, band)| {
                        let (row, col) = complete[sample];
                        raster.data[[band, *row, *col]]
                    },
                ))
            }
        })
    }
}

fn median_of(samples: &mut [f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_by(f64::total_cmp);
    let mid = samples.len() / 2;
    Some(if samples.len() % 2 == 0 {
        (samples[mid - 1] + samples[mid]) / 2.
    } else {
        samples[mid]
    })
}

/// Sample covariance of `(samples, bands)`; zero with fewer than two samples.
fn covariance(samples: &Array2<f64>) -> Array2<f64> {
    let (count, bands) = samples.dim();
    match samples.mean_axis(Axis(0)) {
        Some(means) if count > 1 => {
            let centered = samples - &means;
            centered.t().dot(&centered) / (count - 1) as f64
        }
        _ => Array2::zeros((bands, bands)),
    }
}

impl Engine for MemoryEngine {
    fn scenes(&self, asset_id: &str) -> Result<Vec<SceneInfo>> {
        self.scenes
            .get(asset_id)
            .map(|scenes| scenes.iter().map(|scene| scene.info.clone()).collect())
            .ok_or_else(|| EngineError::UnknownAsset(asset_id.into()).into())
    }

    fn compute_pixels(&self, image: &Image) -> Result<Raster> {
        self.evaluate(image)
    }

    fn compute_array(&self, array: &Array) -> Result<Array2<f64>> {
        match array.expr() {
            ArrayExpr::Literal(values) => Ok(values.clone()),
            ArrayExpr::RegionReduce {
                image,
                reducer,
                region,
                scale,
                options,
            } => self.region_reduce(image, *reducer, region, scale, options),
            ArrayExpr::Eigen(input) => {
                let matrix = self.compute_array(input)?;
                if !matrix.is_square() {
                    Err(EngineError::ShapeMismatch {
                        what: "eigen input",
                        expected: vec![matrix.nrows(), matrix.nrows()],
                        actual: matrix.shape().to_vec(),
                    })?
                }
                let (values, vectors) = jacobi::symmetric_eigen(&matrix)?;
                let mut eigen = Array2::<f64>::zeros((values.len(), values.len() + 1));
                eigen.column_mut(0).assign(&values);
                eigen.slice_mut(s![.., 1..]).assign(&vectors.t());
                Ok(eigen)
            }
            ArrayExpr::SortRowsDescending(input) => {
                let values = self.compute_array(input)?;
                if values.ncols() == 0 {
                    return Ok(values);
                }
                let order = (0..values.nrows())
                    .sorted_by(|lhs, rhs| values[[*rhs, 0]].total_cmp(&values[[*lhs, 0]]))
                    .collect_vec();
                Ok(values.select(Axis(0), &order))
            }
            ArrayExpr::Slice {
                input,
                axis,
                start,
                end,
            } => {
                let values = self.compute_array(input)?;
                let len = match *axis {
                    0 | 1 => values.len_of(Axis(*axis)),
                    _ => usize::MAX,
                };
                let end = end.unwrap_or(len);
                if *axis > 1 || *start > end || end > len {
                    Err(EngineError::ShapeMismatch {
                        what: "slice",
                        expected: vec![*axis, *start, end],
                        actual: values.shape().to_vec(),
                    })?
                }
                Ok(values
                    .slice_axis(Axis(*axis), ndarray::Slice::from(*start..end))
                    .to_owned())
            }
            ArrayExpr::Unary { input, op } => Ok(self.compute_array(input)?.mapv(|value| op.apply(value))),
            ArrayExpr::Difference { lhs, rhs } => {
                let (lhs, rhs) = (self.compute_array(lhs)?, self.compute_array(rhs)?);
                if lhs.shape() != rhs.shape() {
                    Err(EngineError::ShapeMismatch {
                        what: "difference",
                        expected: lhs.shape().to_vec(),
                        actual: rhs.shape().to_vec(),
                    })?
                }
                Ok(lhs - rhs)
            }
        }
    }

    fn compute_bounds(&self, image: &Image) -> Result<Option<Footprint>> {
        if let ImageExpr::Scene(info) = image.expr() {
            return Ok(info.footprint.intersection(self.grid.footprint()).ok());
        }
        let raster = self.evaluate(image)?;
        let valid = raster
            .mask
            .map_axis(Axis(0), |pixel| pixel.iter().any(|valid| *valid));
        Ok(self.grid.bounds_of(valid.view()))
    }
}
