use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, LazyLock},
};

use itertools::Itertools;
use log::info;

mod emit;
mod pace;
pub use emit::Emit;
pub use pace::{PaceOciRrs, PaceOciSr, PaceOciVnir};

use crate::{
    errors::{ConfigurationError, ReflectioError, Result},
    Indexes,
};

/// Static band table of an imaging spectrometer.
pub trait Sensor: Debug {
    const ID: &'static str;
    /// Collection holding this sensor's reflectance scenes, when one is known.
    const ASSET_ID: Option<&'static str>;
    /// Band center wavelengths in nm.
    const WAVELENGTHS: &'static [f64];
    /// Inclusive `(start, end)` index ranges of usable bands.
    const GOOD_RANGES: &'static [(usize, usize)];

    fn bands() -> Result<SensorBands> {
        SensorBands::new(
            Self::ID,
            Self::ASSET_ID,
            Self::WAVELENGTHS.to_vec(),
            Self::GOOD_RANGES.to_vec(),
        )
    }
}

/// Registry entry of a single sensor.
#[derive(Clone, PartialEq)]
pub struct SensorBands {
    id: Arc<str>,
    asset_id: Option<Arc<str>>,
    wavelengths: Arc<[f64]>,
    good_ranges: Arc<[(usize, usize)]>,
}

impl Debug for SensorBands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorBands")
            .field("id", &self.id)
            .field("asset_id", &self.asset_id)
            .field("bands", &self.wavelengths.len())
            .field("good_ranges", &self.good_ranges)
            .finish()
    }
}

impl SensorBands {
    pub fn new(
        id: &str,
        asset_id: Option<&str>,
        wavelengths: Vec<f64>,
        good_ranges: Vec<(usize, usize)>,
    ) -> Result<Self> {
        if wavelengths.is_empty() {
            Err(ConfigurationError::EmptySensor(id.into()))?
        }
        for &(start, end) in good_ranges.iter() {
            if start > end || end >= wavelengths.len() {
                Err(ConfigurationError::MalformedRange {
                    sensor: id.into(),
                    start,
                    end,
                })?
            }
        }
        if good_ranges
            .iter()
            .tuple_windows()
            .any(|(lhs, rhs)| lhs.1 >= rhs.0)
        {
            Err(ConfigurationError::UnorderedRanges(id.into()))?
        }
        Ok(Self {
            id: Arc::from(id),
            asset_id: asset_id.map(Arc::from),
            wavelengths: Arc::from(wavelengths),
            good_ranges: Arc::from(good_ranges),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn asset_id(&self) -> Result<&str> {
        self.asset_id
            .as_deref()
            .ok_or_else(|| ConfigurationError::MissingAsset(self.id.to_string()).into())
    }

    pub fn band_count(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn good_ranges(&self) -> &[(usize, usize)] {
        &self.good_ranges
    }

    /// Subset ordering: good ranges concatenated as registered.
    pub fn good_indexes(&self) -> Indexes {
        Indexes::from_ranges(&self.good_ranges)
    }

    pub fn good_indices(&self) -> Arc<[usize]> {
        self.good_ranges
            .iter()
            .flat_map(|(start, end)| *start..=*end)
            .collect()
    }

    pub fn wavelength(&self, index: usize) -> Result<f64> {
        self.wavelengths
            .get(index)
            .copied()
            .ok_or(ReflectioError::Range {
                index,
                len: self.wavelengths.len(),
            })
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Raw collection band names, `B001`..`B285` for a 285 band sensor.
    pub fn band_names(&self) -> Arc<[String]> {
        let width = self.band_count().to_string().len().max(3);
        (1..=self.band_count())
            .map(|number| format!("B{number:0width$}"))
            .collect()
    }
}

/// Immutable lookup of sensor band tables by sensor id.
#[derive(Debug, Clone)]
pub struct BandRegistry {
    sensors: HashMap<Arc<str>, SensorBands>,
}

static BUILTIN: LazyLock<BandRegistry> = LazyLock::new(|| {
    // Literal tables are covered by tests, a failure here is a programming error.
    BandRegistry::new([
        Emit::bands(),
        PaceOciSr::bands(),
        PaceOciVnir::bands(),
        PaceOciRrs::bands(),
    ])
    .unwrap_or_else(|error| panic!("builtin band tables are invalid: {error}"))
});

impl BandRegistry {
    pub fn new(entries: impl IntoIterator<Item = Result<SensorBands>>) -> Result<Self> {
        let mut sensors = HashMap::new();
        for entry in entries {
            let entry = entry?;
            let id = Arc::clone(&entry.id);
            if sensors.insert(Arc::clone(&id), entry).is_some() {
                Err(ConfigurationError::DuplicateSensor(id.to_string()))?
            }
        }
        let registry = Self { sensors };
        info!("new {registry:?}");
        Ok(registry)
    }

    /// Registry of every sensor table shipped with the crate.
    pub fn builtin() -> &'static BandRegistry {
        &BUILTIN
    }

    pub fn get(&self, sensor_id: &str) -> Result<&SensorBands> {
        self.sensors
            .get(sensor_id)
            .ok_or_else(|| ReflectioError::NotFound(sensor_id.into()))
    }

    pub fn good_indices(&self, sensor_id: &str) -> Result<Arc<[usize]>> {
        Ok(self.get(sensor_id)?.good_indices())
    }

    pub fn wavelength(&self, sensor_id: &str, index: usize) -> Result<f64> {
        self.get(sensor_id)?.wavelength(index)
    }

    pub fn sensor_ids(&self) -> impl Iterator<Item = &str> {
        self.sensors.keys().map(|id| &**id).sorted()
    }
}
