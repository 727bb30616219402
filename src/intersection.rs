use geo::{CoordNum, Rect};

use crate::{errors::Result, CoordUtils};

#[derive(thiserror::Error, Debug)]
pub enum IntersectionError {
    #[error("Ther is no intersection between geometries")]
    NoIntersection,
}

pub trait Intersection {
    type Output;
    fn intersection(&self, rhs: &Self) -> Result<Self::Output>;

    fn intersects(&self, rhs: &Self) -> bool {
        self.intersection(rhs).is_ok()
    }
}

impl<T: CoordNum> Intersection for Rect<T> {
    type Output = Rect<T>;
    fn intersection(&self, rhs: &Self) -> Result<Rect<T>> {
        let lhs_max = self.max();
        let rhs_min = rhs.min();
        if (lhs_max.x < rhs_min.x) | (lhs_max.y < rhs_min.y) {
            Err(IntersectionError::NoIntersection)?
        }

        let lhs_min = self.min();
        let rhs_max = rhs.max();
        if (lhs_min.x > rhs_max.x) | (lhs_min.y > rhs_max.y) {
            Err(IntersectionError::NoIntersection)?
        }

        let min = lhs_min.operate(&rhs_min, |x, y| if x > y { x } else { y });
        let max = lhs_max.operate(&rhs_max, |x, y| if x < y { x } else { y });

        Ok(Self::new(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;
    use rstest::rstest;

    fn rect(min: (f64, f64), max: (f64, f64)) -> Rect<f64> {
        Rect::new(coord! { x: min.0, y: min.1 }, coord! { x: max.0, y: max.1 })
    }

    #[rstest]
    fn overlapping_rects_intersect() {
        let lhs = rect((0., 0.), (10., 10.));
        let rhs = rect((5., -5.), (15., 5.));
        assert_eq!(lhs.intersection(&rhs).unwrap(), rect((5., 0.), (10., 5.)));
    }

    #[rstest]
    #[case(rect((11., 0.), (12., 1.)))]
    #[case(rect((-5., -5.), (-1., -1.)))]
    fn disjoint_rects_do_not_intersect(#[case] rhs: Rect<f64>) {
        let lhs = rect((0., 0.), (10., 10.));
        assert!(!lhs.intersects(&rhs));
    }
}
