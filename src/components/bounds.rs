use geo::{Coord, Rect};
use shrinkwraprs::Shrinkwrap;

use crate::{components::image::Image, errors::Result, intersection::Intersection};

/// Axis aligned region of interest in the collection's coordinate system.
#[derive(Shrinkwrap, Clone, Copy, Debug, PartialEq)]
pub struct Footprint(Rect<f64>);

impl Footprint {
    /// Corners are normalised, any two opposite corners work.
    pub fn new(corner: (f64, f64), opposite: (f64, f64)) -> Self {
        Self(Rect::new(Coord::from(corner), Coord::from(opposite)))
    }

    pub fn contains(&self, point: Coord<f64>) -> bool {
        let (min, max) = (self.0.min(), self.0.max());
        (min.x..=max.x).contains(&point.x) && (min.y..=max.y).contains(&point.y)
    }
}

impl From<Rect<f64>> for Footprint {
    fn from(value: Rect<f64>) -> Self {
        Self(value)
    }
}

impl Intersection for Footprint {
    type Output = Footprint;
    fn intersection(&self, rhs: &Self) -> Result<Self::Output> {
        Ok(Footprint(self.0.intersection(&rhs.0)?))
    }
}

/// Where a region reduction is computed.
#[derive(Clone, Debug)]
pub enum Region {
    Footprint(Footprint),
    /// Bounding box of an image's valid pixels, resolved by the engine.
    BoundsOf(Image),
}

/// Resolution a region reduction is computed at.
#[derive(Clone, Debug)]
pub enum Scale {
    Meters(f64),
    /// Nominal ground sample distance of an image, resolved by the engine.
    NominalOf(Image),
}
