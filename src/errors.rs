pub type Result<T> = std::result::Result<T, ReflectioError>;

#[derive(thiserror::Error, Debug)]
pub enum ReflectioError {
    #[error("Sensor {0} is not registered")]
    NotFound(String),
    #[error("Band index {index} is out of range for {len} bands")]
    Range { index: usize, len: usize },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Engine(#[from] crate::engines::EngineError),
    #[error(transparent)]
    NoIntersection(#[from] crate::intersection::IntersectionError),
    #[error(transparent)]
    NdarrayError(#[from] ndarray::ShapeError),
    #[error(transparent)]
    ConfigParse(#[from] serde_json::Error),
    #[cfg(feature = "gdal")]
    #[error(transparent)]
    GdalError(#[from] gdal::errors::GdalError),
}

/// Caller mistakes detected while building a pipeline.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigurationError {
    #[error("Sensor {0} has no wavelengths")]
    EmptySensor(String),
    #[error("Sensor {0} is registered twice")]
    DuplicateSensor(String),
    #[error("Band range ({start}, {end}) of sensor {sensor} is malformed")]
    MalformedRange {
        sensor: String,
        start: usize,
        end: usize,
    },
    #[error("Band ranges of sensor {0} overlap or are not ascending")]
    UnorderedRanges(String),
    #[error("Sensor {0} has no registered collection asset")]
    MissingAsset(String),
    #[error("Can not combine {lhs} bands with {rhs} bands")]
    BandCountMismatch { lhs: usize, rhs: usize },
    #[error("Expected {expected} band names, got {actual}")]
    BandNameCount { expected: usize, actual: usize },
    #[error("Image has no bands")]
    NoBands,
    #[error("Outline width must be at least one pixel")]
    ZeroOutlineWidth,
    #[error("Date range starts at {start} which is not before {end}")]
    InvalidDateRange { start: String, end: String },
}
