pub mod array;
pub mod bounds;
pub mod collection;
pub mod dates;
pub mod image;
pub mod property;

pub use array::{Array, ArrayExpr, ArrayUnary, RegionReducer};
pub use bounds::{Footprint, Region, Scale};
pub use collection::{Collection, CollectionExpr};
pub use dates::DateRange;
pub use image::{BinaryOp, Image, ImageExpr, PixelType, TemporalReducer};
pub use property::{Properties, Property, PropertyValue, PropertyValues, SCENE_ID, TIME_START};
