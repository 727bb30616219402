use std::{fmt::Debug, sync::Arc};

use crate::{
    components::{
        bounds::Footprint,
        dates::DateRange,
        image::{Image, PixelType, TemporalReducer},
    },
    errors::Result,
    Indexes,
};

/// Per image transformation applied when a collection is resolved.
pub type ImageMap = Arc<dyn Fn(&Image) -> Image + Send + Sync>;

#[derive(Clone)]
pub enum CollectionExpr {
    /// Every scene an engine holds under `asset_id`, ordered by acquisition time.
    Source { asset_id: Arc<str> },
    FilterDate { input: Collection, range: DateRange },
    /// Images whose footprint intersects `roi`.
    FilterBounds { input: Collection, roi: Footprint },
    Select {
        input: Collection,
        indexes: Arc<[usize]>,
    },
    Map { input: Collection, func: ImageMap },
}

impl Debug for CollectionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionExpr::Source { asset_id } => {
                f.debug_struct("Source").field("asset_id", asset_id).finish()
            }
            CollectionExpr::FilterDate { input, range } => f
                .debug_struct("FilterDate")
                .field("input", input)
                .field("range", range)
                .finish(),
            CollectionExpr::FilterBounds { input, roi } => f
                .debug_struct("FilterBounds")
                .field("input", input)
                .field("roi", roi)
                .finish(),
            CollectionExpr::Select { input, indexes } => f
                .debug_struct("Select")
                .field("input", input)
                .field("bands", &indexes.len())
                .finish(),
            CollectionExpr::Map { input, .. } => {
                f.debug_struct("Map").field("input", input).finish()
            }
        }
    }
}

pub struct CollectionNode {
    expr: CollectionExpr,
    band_names: Arc<[String]>,
    pixel_type: PixelType,
}

/// Immutable handle to a lazily resolved, time ordered set of images sharing bands.
#[derive(Clone)]
pub struct Collection(Arc<CollectionNode>);

impl Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("expr", &self.0.expr)
            .field("bands", &self.0.band_names.len())
            .field("pixel_type", &self.0.pixel_type)
            .finish()
    }
}

impl Collection {
    fn init(expr: CollectionExpr, band_names: Arc<[String]>, pixel_type: PixelType) -> Self {
        Self(Arc::new(CollectionNode {
            expr,
            band_names,
            pixel_type,
        }))
    }

    fn derive(&self, expr: CollectionExpr) -> Self {
        Self::init(expr, Arc::clone(&self.0.band_names), self.0.pixel_type)
    }

    pub fn source(asset_id: &str, band_names: Arc<[String]>, pixel_type: PixelType) -> Self {
        Self::init(
            CollectionExpr::Source {
                asset_id: Arc::from(asset_id),
            },
            band_names,
            pixel_type,
        )
    }

    pub fn expr(&self) -> &CollectionExpr {
        &self.0.expr
    }

    pub fn band_names(&self) -> &Arc<[String]> {
        &self.0.band_names
    }

    pub fn band_count(&self) -> usize {
        self.0.band_names.len()
    }

    pub fn pixel_type(&self) -> PixelType {
        self.0.pixel_type
    }

    pub fn filter_date(&self, range: DateRange) -> Self {
        self.derive(CollectionExpr::FilterDate {
            input: self.clone(),
            range,
        })
    }

    pub fn filter_bounds(&self, roi: Footprint) -> Self {
        self.derive(CollectionExpr::FilterBounds {
            input: self.clone(),
            roi,
        })
    }

    pub fn select(&self, indexes: impl Into<Indexes>) -> Result<Self> {
        let indexes = indexes.into().indexes_from(self.band_count())?;
        let band_names = indexes
            .iter()
            .map(|idx| self.0.band_names[*idx].clone())
            .collect();
        Ok(Self::init(
            CollectionExpr::Select {
                input: self.clone(),
                indexes,
            },
            band_names,
            self.0.pixel_type,
        ))
    }

    /// Applies `func` to every image; `func` must keep the band layout.
    pub fn map(
        &self,
        pixel_type: PixelType,
        func: impl Fn(&Image) -> Image + Send + Sync + 'static,
    ) -> Self {
        Self::init(
            CollectionExpr::Map {
                input: self.clone(),
                func: Arc::new(func),
            },
            Arc::clone(&self.0.band_names),
            pixel_type,
        )
    }

    pub fn reduce(&self, reducer: TemporalReducer) -> Image {
        Image::reduce(self, reducer)
    }

    /// Pixel wise median across the collection; empty collections yield a fully masked image.
    pub fn median(&self) -> Image {
        self.reduce(TemporalReducer::Median)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::property::TIME_START, errors::ReflectioError, Property};
    use rstest::rstest;

    fn source(bands: usize) -> Collection {
        let names = (0..bands).map(|idx| format!("B{idx}")).collect();
        Collection::source("TEST/ASSET", names, PixelType::Float64)
    }

    #[rstest]
    fn select_renames_bands() {
        let selected = source(5).select([4usize, 1]).unwrap();
        assert_eq!(selected.band_names().as_ref(), ["B4", "B1"]);
    }

    #[rstest]
    fn select_out_of_range_fails() {
        assert!(matches!(
            source(5).select(0..6),
            Err(ReflectioError::Range { index: 5, len: 5 })
        ));
    }

    #[rstest]
    fn median_keeps_schema_and_first_time() {
        let image = source(3).median();
        assert_eq!(image.band_count(), 3);
        assert!(matches!(
            image.properties().get(TIME_START),
            Some(Property::FirstOf { .. })
        ));
    }

    #[rstest]
    fn map_changes_pixel_type() {
        let mapped = source(2).map(PixelType::Int16, |image| image.to_int16());
        assert_eq!(mapped.pixel_type(), PixelType::Int16);
        assert_eq!(mapped.band_count(), 2);
    }
}
