//! Graph builders for compositing and band analysis of hyperspectral collections.
//!
//! Every function here only assembles a computation graph; pixels are
//! touched when an [crate::engines::Engine] evaluates the result.

pub mod composite;
pub mod normalize;
pub mod pca;
pub mod rescale;
pub mod views;

pub use composite::{belize_roi, BandSelection, Compositor};
pub use normalize::{normalize, DEGENERATE_BANDS};
pub use pca::{component_key, pca, variance_report, UNRELIABLE_COMPONENTS};
pub use rescale::{decode, decode_value, encode, encode_value, REFLECTANCE_SCALE};
pub use views::CollectionViews;
