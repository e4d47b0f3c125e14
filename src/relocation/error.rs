use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading one of the input sources. All of them abort the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to deserialize XML from {path} at '{at}': {message}")]
    Xml {
        path: String,
        at: String,
        message: String,
    },

    #[error("Failed to parse GeoJSON from {path}: {source}")]
    GeoJson {
        path: String,
        #[source]
        source: geojson::Error,
    },

    #[error("Zone source {0} is not a GeoJSON FeatureCollection")]
    NotAFeatureCollection(String),

    #[error("Feature #{index} in {path} has no geometry")]
    MissingGeometry { path: String, index: usize },

    #[error("Zone {zone} has an unsupported geometry (expected Polygon or MultiPolygon)")]
    UnsupportedGeometry { zone: String },

    #[error("Feature #{index} in {path} has neither an id nor a '{property}' property")]
    MissingZoneId {
        path: String,
        index: usize,
        property: String,
    },

    #[error("Zone id {0} occurs more than once")]
    DuplicateZoneId(String),

    #[error("Tried to load {0}. File format not supported. Either use `.xml` or `.xml.gz` as extension")]
    UnsupportedFormat(String),

    #[error("Cannot load {0}. Remote sources require the `http` feature")]
    RemoteSourceUnsupported(String),

    #[cfg(feature = "http")]
    #[error("Could not fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while writing the relocated population.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Could not create {path:?}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: quick_xml::se::SeError,
    },

    #[error("Tried to write {0:?}. File format not supported. Either use `.xml` or `.xml.gz` as extension")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Expected all five positional paths <population> <zones> <facilities> <output> <log_dir> or none, got {0}")]
    PartialPositionals(usize),

    #[error("Failed to open config file at {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("At least one relocation category has to be configured")]
    NoCategories,
}

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Could not set up logging in {path:?}: {source}")]
    Logging {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },
}
