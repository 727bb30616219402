//! Boundary to the raster engine that realises computation graphs.
//!
//! Graph construction in this crate never touches pixels. An [Engine] is
//! asked for pixels, arrays, bounds and properties once a caller needs them;
//! [memory::MemoryEngine] answers those requests from in-memory arrays.

pub mod memory;
mod jacobi;
#[cfg(feature = "gdal")]
pub mod gdal_source;
#[cfg(test)]
pub(crate) mod fixtures;

use std::{fmt::Debug, sync::Arc};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::{debug, warn};
use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::{
    components::{
        Array, Collection, CollectionExpr, Footprint, Image, PixelType, Property, PropertyValue,
        PropertyValues, TIME_START,
    },
    errors::Result,
    intersection::Intersection,
    Indexes,
};

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("No collection {0} is known to the engine")]
    UnknownAsset(String),
    #[error("Scene {0} is not held by the engine")]
    UnknownScene(String),
    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Reduction visits {pixels} pixels, more than the {max_pixels} allowed")]
    TooManyPixels { pixels: usize, max_pixels: f64 },
    #[error("Eigen decomposition did not converge in {sweeps} sweeps, relative residual {residual:e}")]
    NotConverged { sweeps: usize, residual: f64 },
}

/// Scene metadata reported by an engine for a collection.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneInfo {
    pub asset_id: Arc<str>,
    pub id: Arc<str>,
    pub time_start: DateTime<Utc>,
    pub footprint: Footprint,
}

/// Realised pixels of an image, `(bands, rows, cols)`.
///
/// `mask` is `true` where a sample holds data.
#[derive(Clone, Debug)]
pub struct Raster {
    pub band_names: Arc<[String]>,
    pub pixel_type: PixelType,
    pub data: Array3<f64>,
    pub mask: Array3<bool>,
}

impl Raster {
    /// (bands, rows, cols)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn band_index(&self, name: &str) -> Option<usize> {
        self.band_names.iter().position(|band| band == name)
    }

    pub fn band(&self, name: &str) -> Option<ArrayView2<'_, f64>> {
        self.band_index(name)
            .map(|idx| self.data.index_axis(Axis(0), idx))
    }

    /// `None` for masked samples.
    pub fn value(&self, band: usize, row: usize, col: usize) -> Option<f64> {
        self.mask
            .get((band, row, col))
            .filter(|valid| **valid)
            .and_then(|_| self.data.get((band, row, col)).copied())
    }

    /// True when no sample of any band holds data.
    pub fn is_empty_coverage(&self) -> bool {
        !self.mask.iter().any(|valid| *valid)
    }
}

/// Capability to realise computation graphs.
///
/// Implementations submit the graph to whatever executes it and block
/// until the result is available.
pub trait Engine: Send + Sync + Debug {
    /// Scenes held under `asset_id`.
    fn scenes(&self, asset_id: &str) -> Result<Vec<SceneInfo>>;

    fn compute_pixels(&self, image: &Image) -> Result<Raster>;

    fn compute_array(&self, array: &Array) -> Result<Array2<f64>>;

    /// Bounding box of the image's valid pixels, `None` when it has none.
    fn compute_bounds(&self, image: &Image) -> Result<Option<Footprint>>;

    /// Resolves a collection into per image graphs, ordered by acquisition time.
    fn compute_images(&self, collection: &Collection) -> Result<Vec<Image>> {
        match collection.expr() {
            CollectionExpr::Source { asset_id } => {
                let images = self
                    .scenes(asset_id)?
                    .into_iter()
                    .sorted_by_key(|scene| scene.time_start)
                    .map(|scene| {
                        Image::scene(
                            scene,
                            Arc::clone(collection.band_names()),
                            collection.pixel_type(),
                        )
                    })
                    .collect_vec();
                debug!("{} holds {} scenes", asset_id, images.len());
                Ok(images)
            }
            CollectionExpr::FilterDate { input, range } => {
                let mut images = Vec::new();
                for image in self.compute_images(input)? {
                    let time_start = self.compute_properties(&image)?.remove(TIME_START);
                    if time_start
                        .as_ref()
                        .and_then(PropertyValue::as_time)
                        .is_some_and(|time| range.contains(time))
                    {
                        images.push(image);
                    }
                }
                Ok(images)
            }
            CollectionExpr::FilterBounds { input, roi } => {
                let mut images = Vec::new();
                for image in self.compute_images(input)? {
                    if self
                        .compute_bounds(&image)?
                        .is_some_and(|bounds| bounds.intersects(roi))
                    {
                        images.push(image);
                    }
                }
                Ok(images)
            }
            CollectionExpr::Select { input, indexes } => self
                .compute_images(input)?
                .iter()
                .map(|image| image.select(Indexes::from(Arc::clone(indexes))))
                .collect(),
            CollectionExpr::Map { input, func } => Ok(self
                .compute_images(input)?
                .iter()
                .map(|image| func(image))
                .collect()),
        }
    }

    /// Number of images a collection resolves to.
    fn compute_size(&self, collection: &Collection) -> Result<usize> {
        Ok(self.compute_images(collection)?.len())
    }

    /// `None` when the property resolves to nothing, e.g. copied from an empty collection.
    fn compute_property(&self, property: &Property) -> Result<Option<PropertyValue>> {
        match property {
            Property::Value(value) => Ok(Some(value.clone())),
            Property::CopiedFrom { source, key } => {
                Ok(self.compute_properties(source)?.remove(key))
            }
            Property::FirstOf { collection, key } => {
                match self.compute_images(collection)?.first() {
                    Some(first) => Ok(self.compute_properties(first)?.remove(key)),
                    None => Ok(None),
                }
            }
            Property::PercentOfTotal { values, index } => {
                let values = self.compute_array(values)?;
                let total: f64 = values.sum();
                let value = values.iter().nth(*index).copied().ok_or_else(|| {
                    EngineError::ShapeMismatch {
                        what: "percentage source",
                        expected: vec![index + 1],
                        actual: values.shape().to_vec(),
                    }
                })?;
                Ok(Some(PropertyValue::Text(format!(
                    "{:.2}",
                    value / total * 100.
                ))))
            }
            Property::NearZero {
                values,
                labels,
                tolerance,
            } => {
                let values = self.compute_array(values)?;
                if values.len() != labels.len() {
                    Err(EngineError::ShapeMismatch {
                        what: "flag source",
                        expected: vec![labels.len()],
                        actual: values.shape().to_vec(),
                    })?
                }
                let flagged = values
                    .iter()
                    .zip(labels.iter())
                    .filter(|(value, _)| value.abs() <= *tolerance)
                    .map(|(_, label)| label)
                    .join(",");
                if !flagged.is_empty() {
                    warn!("numerically degenerate: {flagged}");
                }
                Ok(Some(PropertyValue::Text(flagged)))
            }
        }
    }

    fn compute_properties(&self, image: &Image) -> Result<PropertyValues> {
        let mut values = PropertyValues::new();
        for (key, property) in image.properties() {
            if let Some(value) = self.compute_property(property)? {
                values.insert(key.clone(), value);
            }
        }
        Ok(values)
    }
}
