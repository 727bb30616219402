use log::info;

use crate::{
    components::{Collection, PixelType},
    errors::Result,
    pipeline::rescale,
    sensors::SensorBands,
};

/// Lazy views over the raw reflectance collection of one sensor.
#[derive(Clone, Debug)]
pub struct CollectionViews {
    sensor: SensorBands,
    source: Collection,
}

impl CollectionViews {
    /// Views over the sensor's registered collection.
    pub fn new(sensor: &SensorBands) -> Result<Self> {
        Ok(Self::with_asset(sensor, sensor.asset_id()?))
    }

    /// Views over `asset_id`, for sensors without a registered collection.
    pub fn with_asset(sensor: &SensorBands, asset_id: &str) -> Self {
        let views = Self {
            sensor: sensor.clone(),
            source: Collection::source(asset_id, sensor.band_names(), PixelType::Float64),
        };
        info!("new {views:?}");
        views
    }

    pub fn sensor(&self) -> &SensorBands {
        &self.sensor
    }

    pub fn source(&self) -> &Collection {
        &self.source
    }

    /// Every band.
    pub fn full(&self) -> Collection {
        self.source.clone()
    }

    /// Good bands only, in registry order.
    pub fn subset(&self) -> Result<Collection> {
        self.source.select(self.sensor.good_indexes())
    }

    /// Every band [rescale::encode]d to fixed point.
    pub fn rescaled(&self) -> Collection {
        self.source.map(PixelType::Int16, rescale::encode)
    }
}
