use std::{fmt::Debug, sync::Arc};

use ndarray::Array2;

use crate::{
    components::{
        array::Array,
        bounds::Footprint,
        collection::Collection,
        property::{Properties, Property, PropertyValue, SCENE_ID, TIME_START},
    },
    engines::SceneInfo,
    errors::{ConfigurationError, Result},
    Indexes,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum PixelType {
    /// Fixed point storage, values truncate toward zero and saturate.
    Int16,
    Float64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    /// `None` marks a sample with no defined result (division by zero).
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            BinaryOp::Subtract => Some(lhs - rhs),
            BinaryOp::Multiply => Some(lhs * rhs),
            BinaryOp::Divide => (rhs != 0.).then(|| lhs / rhs),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemporalReducer {
    /// Per pixel, per band median of the valid samples.
    Median,
}

/// Node of an image computation graph.
#[derive(Clone, Debug)]
pub enum ImageExpr {
    /// Scene held by the engine.
    Scene(SceneInfo),
    /// Unbounded image, one value per band taken from a flattened array.
    Constant(Array),
    Select {
        input: Image,
        indexes: Arc<[usize]>,
    },
    Cat(Arc<[Image]>),
    /// Single band operands are broadcast over the other operand's bands.
    Binary {
        op: BinaryOp,
        lhs: Image,
        rhs: Image,
    },
    Cast {
        input: Image,
        pixel_type: PixelType,
    },
    /// Masked samples replaced by `fill` and unmasked.
    Unmask {
        input: Image,
        fill: f64,
    },
    /// Valid where both `input` and `mask` are valid.
    UpdateMask {
        input: Image,
        mask: Image,
    },
    Clip {
        input: Image,
        roi: Footprint,
    },
    Reduce {
        collection: Collection,
        reducer: TemporalReducer,
    },
    /// Output band `i` is the dot product of row `i` of `matrix` with the pixel vector.
    MatrixProject {
        input: Image,
        matrix: Array,
    },
    /// Zero valued pixels of `roi` lying within `width` pixels of its edge.
    Outline {
        roi: Footprint,
        width: usize,
    },
}

pub struct ImageNode {
    expr: ImageExpr,
    band_names: Arc<[String]>,
    pixel_type: PixelType,
    properties: Properties,
}

/// Immutable handle to a lazily evaluated multi band image.
///
/// Every operation returns a new handle; nothing is computed until an
/// [crate::engines::Engine] is asked for pixels, arrays or properties.
#[derive(Clone)]
pub struct Image(Arc<ImageNode>);

impl Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let f = &mut f.debug_struct("Image");
        let properties: Vec<&String> = self.0.properties.keys().collect();
        f.field("op", &self.op_name())
            .field("bands", &self.0.band_names)
            .field("pixel_type", &self.0.pixel_type)
            .field("properties", &properties)
            .finish()
    }
}

impl Image {
    fn init(
        expr: ImageExpr,
        band_names: Arc<[String]>,
        pixel_type: PixelType,
        properties: Properties,
    ) -> Self {
        Self(Arc::new(ImageNode {
            expr,
            band_names,
            pixel_type,
            properties,
        }))
    }

    fn derive(&self, expr: ImageExpr) -> Self {
        Self::init(
            expr,
            Arc::clone(&self.0.band_names),
            self.0.pixel_type,
            self.0.properties.clone(),
        )
    }

    pub fn scene(info: SceneInfo, band_names: Arc<[String]>, pixel_type: PixelType) -> Self {
        let properties = Properties::from([
            (TIME_START.into(), Property::from(PropertyValue::from(info.time_start))),
            (
                SCENE_ID.into(),
                Property::from(PropertyValue::from(info.id.to_string())),
            ),
        ]);
        Self::init(ImageExpr::Scene(info), band_names, pixel_type, properties)
    }

    pub fn constant(values: &[f64]) -> Result<Self> {
        let band_names: Arc<[String]> = match values.len() {
            0 => Err(ConfigurationError::NoBands)?,
            1 => Arc::from([String::from("constant")]),
            len => (0..len).map(|idx| format!("constant_{idx}")).collect(),
        };
        let array = Array::literal(Array2::from_shape_vec((1, values.len()), values.to_vec())?);
        Self::constant_array(array, band_names)
    }

    /// Constant image whose band values come from an array evaluated later.
    ///
    /// The flattened array must hold exactly one value per band name.
    pub fn constant_array(array: Array, band_names: Arc<[String]>) -> Result<Self> {
        if band_names.is_empty() {
            Err(ConfigurationError::NoBands)?
        }
        Ok(Self::init(
            ImageExpr::Constant(array),
            band_names,
            PixelType::Float64,
            Properties::new(),
        ))
    }

    /// Concatenates bands of `images` in order, keeping the first image's properties.
    pub fn cat(images: impl IntoIterator<Item = Image>) -> Result<Self> {
        let images: Arc<[Image]> = images
            .into_iter()
            .flat_map(|image| match &image.0.expr {
                ImageExpr::Cat(parts) => parts.to_vec(),
                _ => vec![image],
            })
            .collect();
        let first = images.first().ok_or(ConfigurationError::NoBands)?;
        let band_names = images
            .iter()
            .flat_map(|image| image.band_names().iter().cloned())
            .collect();
        let pixel_type = if images
            .iter()
            .all(|image| image.pixel_type() == first.pixel_type())
        {
            first.pixel_type()
        } else {
            PixelType::Float64
        };
        let properties = first.0.properties.clone();
        Ok(Self::init(
            ImageExpr::Cat(images),
            band_names,
            pixel_type,
            properties,
        ))
    }

    pub fn expr(&self) -> &ImageExpr {
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

    pub fn properties(&self) -> &Properties {
        &self.0.properties
    }

    fn op_name(&self) -> &'static str {
        match self.0.expr {
            ImageExpr::Scene(_) => "scene",
            ImageExpr::Constant(_) => "constant",
            ImageExpr::Select { .. } => "select",
            ImageExpr::Cat(_) => "cat",
            ImageExpr::Binary { .. } => "binary",
            ImageExpr::Cast { .. } => "cast",
            ImageExpr::Unmask { .. } => "unmask",
            ImageExpr::UpdateMask { .. } => "update_mask",
            ImageExpr::Clip { .. } => "clip",
            ImageExpr::Reduce { .. } => "reduce",
            ImageExpr::MatrixProject { .. } => "matrix_project",
            ImageExpr::Outline { .. } => "outline",
        }
    }

    pub fn select(&self, indexes: impl Into<Indexes>) -> Result<Self> {
        let indexes = indexes.into().indexes_from(self.band_count())?;
        let band_names = indexes
            .iter()
            .map(|idx| self.0.band_names[*idx].clone())
            .collect();
        Ok(Self::init(
            ImageExpr::Select {
                input: self.clone(),
                indexes,
            },
            band_names,
            self.0.pixel_type,
            self.0.properties.clone(),
        ))
    }

    pub fn add_bands(&self, other: &Image) -> Result<Self> {
        Self::cat([self.clone(), other.clone()])
    }

    pub fn with_band_names(&self, band_names: Arc<[String]>) -> Result<Self> {
        if band_names.len() != self.band_count() {
            Err(ConfigurationError::BandNameCount {
                expected: self.band_count(),
                actual: band_names.len(),
            })?
        }
        Ok(Self::init(
            self.0.expr.clone(),
            band_names,
            self.0.pixel_type,
            self.0.properties.clone(),
        ))
    }

    /// Band wise arithmetic; a single band operand is broadcast.
    pub fn binary(&self, op: BinaryOp, rhs: &Image) -> Result<Self> {
        let band_names = match (self.band_count(), rhs.band_count()) {
            (lhs, rhs_count) if lhs == rhs_count || rhs_count == 1 => Arc::clone(self.band_names()),
            (1, _) => Arc::clone(rhs.band_names()),
            (lhs, rhs) => Err(ConfigurationError::BandCountMismatch { lhs, rhs })?,
        };
        Ok(Self::init(
            ImageExpr::Binary {
                op,
                lhs: self.clone(),
                rhs: rhs.clone(),
            },
            band_names,
            PixelType::Float64,
            Properties::new(),
        ))
    }

    pub fn subtract(&self, rhs: &Image) -> Result<Self> {
        self.binary(BinaryOp::Subtract, rhs)
    }

    pub fn multiply(&self, rhs: &Image) -> Result<Self> {
        self.binary(BinaryOp::Multiply, rhs)
    }

    pub fn divide(&self, rhs: &Image) -> Result<Self> {
        self.binary(BinaryOp::Divide, rhs)
    }

    fn scalar(&self, op: BinaryOp, value: f64) -> Self {
        let constant = Array::literal(Array2::from_elem((1, 1), value));
        let rhs = Self::init(
            ImageExpr::Constant(constant),
            Arc::from([String::from("constant")]),
            PixelType::Float64,
            Properties::new(),
        );
        Self::init(
            ImageExpr::Binary {
                op,
                lhs: self.clone(),
                rhs,
            },
            Arc::clone(self.band_names()),
            PixelType::Float64,
            Properties::new(),
        )
    }

    pub fn multiply_scalar(&self, value: f64) -> Self {
        self.scalar(BinaryOp::Multiply, value)
    }

    pub fn divide_scalar(&self, value: f64) -> Self {
        self.scalar(BinaryOp::Divide, value)
    }

    pub fn cast(&self, pixel_type: PixelType) -> Self {
        Self::init(
            ImageExpr::Cast {
                input: self.clone(),
                pixel_type,
            },
            Arc::clone(&self.0.band_names),
            pixel_type,
            self.0.properties.clone(),
        )
    }

    pub fn to_int16(&self) -> Self {
        self.cast(PixelType::Int16)
    }

    pub fn unmask(&self, fill: f64) -> Self {
        self.derive(ImageExpr::Unmask {
            input: self.clone(),
            fill,
        })
    }

    /// Masks samples wherever `mask` is masked; a single band mask is broadcast.
    pub fn update_mask(&self, mask: &Image) -> Result<Self> {
        if mask.band_count() != 1 && mask.band_count() != self.band_count() {
            Err(ConfigurationError::BandCountMismatch {
                lhs: self.band_count(),
                rhs: mask.band_count(),
            })?
        }
        Ok(self.derive(ImageExpr::UpdateMask {
            input: self.clone(),
            mask: mask.clone(),
        }))
    }

    pub fn clip(&self, roi: Footprint) -> Self {
        self.derive(ImageExpr::Clip {
            input: self.clone(),
            roi,
        })
    }

    /// Single band drawing of the edge of `roi`, for overlaying it on a map.
    pub fn outline(roi: Footprint, width: usize) -> Result<Self> {
        if width == 0 {
            Err(ConfigurationError::ZeroOutlineWidth)?
        }
        Ok(Self::init(
            ImageExpr::Outline { roi, width },
            Arc::from([String::from("outline")]),
            PixelType::Int16,
            Properties::new(),
        ))
    }

    pub fn matrix_project(&self, matrix: Array, band_names: Arc<[String]>) -> Result<Self> {
        if band_names.is_empty() {
            Err(ConfigurationError::NoBands)?
        }
        Ok(Self::init(
            ImageExpr::MatrixProject {
                input: self.clone(),
                matrix,
            },
            band_names,
            PixelType::Float64,
            Properties::new(),
        ))
    }

    pub(crate) fn reduce(collection: &Collection, reducer: TemporalReducer) -> Self {
        let properties = Properties::from([(
            TIME_START.into(),
            Property::FirstOf {
                collection: collection.clone(),
                key: TIME_START.into(),
            },
        )]);
        Self::init(
            ImageExpr::Reduce {
                collection: collection.clone(),
                reducer,
            },
            Arc::clone(collection.band_names()),
            PixelType::Float64,
            properties,
        )
    }

    pub fn set(&self, key: &str, property: Property) -> Self {
        let mut properties = self.0.properties.clone();
        properties.insert(key.into(), property);
        Self::init(
            self.0.expr.clone(),
            Arc::clone(&self.0.band_names),
            self.0.pixel_type,
            properties,
        )
    }

    pub fn set_value(&self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.set(key, Property::Value(value.into()))
    }
}
