use std::{fmt::Debug, sync::Arc};

use ndarray::Array2;

use crate::{
    components::{
        bounds::{Region, Scale},
        image::Image,
    },
    config::ReduceOptions,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionReducer {
    /// `1 x N` per band mean.
    Mean,
    /// `1 x N` per band minimum.
    Min,
    /// `1 x N` per band maximum.
    Max,
    /// `N x N` sample covariance of pixels valid in every band.
    CenteredCovariance,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArrayUnary {
    Abs,
    Sqrt,
    /// Elements with magnitude at most `tolerance` become `value`.
    ReplaceNearZero { tolerance: f64, value: f64 },
}

impl ArrayUnary {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            ArrayUnary::Abs => value.abs(),
            ArrayUnary::Sqrt => value.sqrt(),
            ArrayUnary::ReplaceNearZero {
                tolerance,
                value: replacement,
            } => {
                if value.abs() <= tolerance {
                    replacement
                } else {
                    value
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum ArrayExpr {
    Literal(Array2<f64>),
    RegionReduce {
        image: Image,
        reducer: RegionReducer,
        region: Region,
        scale: Scale,
        options: ReduceOptions,
    },
    /// `N x (N + 1)`: row `i` holds eigenvalue `i` followed by its eigenvector,
    /// in whatever order the decomposition produces.
    Eigen(Array),
    /// Rows reordered by descending first column.
    SortRowsDescending(Array),
    Slice {
        input: Array,
        axis: usize,
        start: usize,
        end: Option<usize>,
    },
    Unary {
        input: Array,
        op: ArrayUnary,
    },
    Difference {
        lhs: Array,
        rhs: Array,
    },
}

/// Immutable handle to a lazily evaluated 2-D array.
#[derive(Clone)]
pub struct Array(Arc<ArrayExpr>);

impl Debug for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.expr() {
            ArrayExpr::Literal(values) => f.debug_tuple("Literal").field(&values.dim()).finish(),
            ArrayExpr::RegionReduce { reducer, .. } => {
                f.debug_tuple("RegionReduce").field(reducer).finish()
            }
            ArrayExpr::Eigen(_) => f.write_str("Eigen"),
            ArrayExpr::SortRowsDescending(_) => f.write_str("SortRowsDescending"),
            ArrayExpr::Slice {
                axis, start, end, ..
            } => f
                .debug_struct("Slice")
                .field("axis", axis)
                .field("start", start)
                .field("end", end)
                .finish(),
            ArrayExpr::Unary { op, .. } => f.debug_tuple("Unary").field(op).finish(),
            ArrayExpr::Difference { .. } => f.write_str("Difference"),
        }
    }
}

impl Array {
    fn init(expr: ArrayExpr) -> Self {
        Self(Arc::new(expr))
    }

    pub fn literal(values: Array2<f64>) -> Self {
        Self::init(ArrayExpr::Literal(values))
    }

    pub fn region_reduce(
        image: &Image,
        reducer: RegionReducer,
        region: Region,
        scale: Scale,
        options: ReduceOptions,
    ) -> Self {
        Self::init(ArrayExpr::RegionReduce {
            image: image.clone(),
            reducer,
            region,
            scale,
            options,
        })
    }

    pub fn expr(&self) -> &ArrayExpr {
        &self.0
    }

    pub fn eigen(&self) -> Self {
        Self::init(ArrayExpr::Eigen(self.clone()))
    }

    pub fn sort_rows_descending(&self) -> Self {
        Self::init(ArrayExpr::SortRowsDescending(self.clone()))
    }

    /// `[start, end)` along `axis`, to the end when `end` is `None`.
    pub fn slice(&self, axis: usize, start: usize, end: Option<usize>) -> Self {
        Self::init(ArrayExpr::Slice {
            input: self.clone(),
            axis,
            start,
            end,
        })
    }

    pub fn unary(&self, op: ArrayUnary) -> Self {
        Self::init(ArrayExpr::Unary {
            input: self.clone(),
            op,
        })
    }

    pub fn abs(&self) -> Self {
        self.unary(ArrayUnary::Abs)
    }

    pub fn sqrt(&self) -> Self {
        self.unary(ArrayUnary::Sqrt)
    }

    pub fn subtract(&self, rhs: &Array) -> Self {
        Self::init(ArrayExpr::Difference {
            lhs: self.clone(),
            rhs: rhs.clone(),
        })
    }
}
