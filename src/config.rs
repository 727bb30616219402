use std::io::Read;

use crate::errors::Result;

/// Knobs forwarded to the engine's region reducers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ReduceOptions {
    /// Upper bound on the pixels a single reduction may visit.
    pub max_pixels: f64,
    /// Coarsen the scale instead of failing when `max_pixels` is exceeded.
    ///
    /// Extrema and means computed this way are approximate and can miss
    /// isolated values on large or heterogeneous regions.
    pub best_effort: bool,
    /// Tiling hint for distributed engines, ignored in memory.
    pub tile_scale: u32,
}

impl ReduceOptions {
    pub const fn normalization() -> Self {
        Self {
            max_pixels: 1e9,
            best_effort: true,
            tile_scale: 16,
        }
    }

    pub const fn pca() -> Self {
        Self {
            max_pixels: 1e13,
            best_effort: false,
            tile_scale: 16,
        }
    }
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            max_pixels: 1e7,
            best_effort: false,
            tile_scale: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub normalize: ReduceOptions,
    pub pca: ReduceOptions,
    /// Band spread at or below which normalization flags the band degenerate.
    pub degenerate_tolerance: f64,
    /// Eigenvalue magnitude at or below which a component is flagged unreliable.
    pub unreliable_tolerance: f64,
    pub clip_composites: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalize: ReduceOptions::normalization(),
            pca: ReduceOptions::pca(),
            degenerate_tolerance: 0.,
            unreliable_tolerance: 1e-12,
            clip_composites: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReflectioError;
    use rstest::rstest;

    #[rstest]
    fn missing_fields_take_defaults() {
        let config = PipelineConfig::from_json(r#"{"clip_composites": true}"#).unwrap();
        assert!(config.clip_composites);
        assert_eq!(config.normalize, ReduceOptions::normalization());
        assert_eq!(config.pca, ReduceOptions::pca());
    }

    #[rstest]
    fn nested_options_merge_with_defaults() {
        let config =
            PipelineConfig::from_reader(r#"{"pca": {"best_effort": true}}"#.as_bytes()).unwrap();
        assert!(config.pca.best_effort);
        assert_eq!(config.pca.max_pixels, ReduceOptions::default().max_pixels);
    }

    #[rstest]
    fn malformed_json_is_reported() {
        assert!(matches!(
            PipelineConfig::from_json("{"),
            Err(ReflectioError::ConfigParse(_))
        ));
    }
}
