use std::{collections::BTreeMap, sync::Arc};

use log::info;

use crate::{
    components::{Array, Image, Property, Region, RegionReducer, Scale, TIME_START},
    config::PipelineConfig,
    engines::Engine,
    errors::Result,
};

/// Comma separated names of components whose eigenvalue magnitude was at or
/// below [PipelineConfig::unreliable_tolerance].
pub const UNRELIABLE_COMPONENTS: &str = "unreliable_components";

/// Property key of the variance share of the component at `index`, `"01"` for the first.
pub fn component_key(index: usize) -> String {
    format!("{:02}", index + 1)
}

/// Unit variance principal components `pc1..pcN` of `image`.
///
/// Masked samples are filled with zero for the statistics, so they bias the
/// mean and covariance near no-data edges; the input mask is restored on the
/// output. Components are ordered by descending eigenvalue and each carries
/// its percent of total variance under [component_key].
pub fn pca(image: &Image, config: &PipelineConfig) -> Result<Image> {
    let names = image.band_names();
    let region = Region::BoundsOf(image.clone());
    let scale = Scale::NominalOf(image.clone());

    let filled = image.unmask(0.);
    let means = Array::region_reduce(
        &filled,
        RegionReducer::Mean,
        region.clone(),
        scale.clone(),
        config.pca,
    );
    let centered = filled.subtract(&Image::constant_array(means, Arc::clone(names))?)?;
    let covariance = Array::region_reduce(
        &centered,
        RegionReducer::CenteredCovariance,
        region,
        scale,
        config.pca,
    );

    let eigen = covariance.eigen().sort_rows_descending();
    let eigenvalues = eigen.slice(1, 0, Some(1));
    let eigenvectors = eigen.slice(1, 1, None);

    let components: Arc<[String]> = (1..=names.len()).map(|idx| format!("pc{idx}")).collect();
    let deviations = (1..=names.len()).map(|idx| format!("sd{idx}")).collect();
    let mut result = centered
        .matrix_project(eigenvectors, Arc::clone(&components))?
        .divide(&Image::constant_array(
            eigenvalues.abs().sqrt(),
            deviations,
        )?)?
        .update_mask(image)?
        .set(TIME_START, Property::copied(image, TIME_START))
        .set(
            UNRELIABLE_COMPONENTS,
            Property::NearZero {
                values: eigenvalues.clone(),
                labels: components,
                tolerance: config.unreliable_tolerance,
            },
        );
    for index in 0..names.len() {
        result = result.set(
            &component_key(index),
            Property::PercentOfTotal {
                values: eigenvalues.clone(),
                index,
            },
        );
    }
    info!("new pca {result:?}");
    Ok(result)
}

/// Evaluates the variance share of every component of a [pca] image.
pub fn variance_report(image: &Image, engine: &dyn Engine) -> Result<BTreeMap<String, String>> {
    let mut report = BTreeMap::new();
    for (key, property) in image.properties() {
        if let Property::PercentOfTotal { .. } = property {
            if let Some(value) = engine.compute_property(property)? {
                let percent = value.as_text().map(String::from).unwrap_or_default();
                info!("component {key}: {percent}% of variance");
                report.insert(key.clone(), percent);
            }
        }
    }
    Ok(report)
}
