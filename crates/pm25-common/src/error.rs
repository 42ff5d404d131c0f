//! Error types for the PM2.5 map service.

use thiserror::Error;

/// Result type alias using Pm25Error.
pub type Pm25Result<T> = Result<T, Pm25Error>;

/// Primary error type for map generation.
#[derive(Debug, Error)]
pub enum Pm25Error {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    // === Data Errors ===
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    #[error("Failed to read raster: {0}")]
    DataReadError(String),

    #[error("Band index {index} out of range (raster has {count} bands)")]
    BandIndexOutOfRange { index: usize, count: usize },

    #[error("Invalid raster data: {0}")]
    DataError(String),

    #[error("Failed to write raster: {0}")]
    RasterWriteError(String),

    // === Model / Rendering Errors ===
    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Remote Errors ===
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Export request failed: {0}")]
    ExportError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl Pm25Error {
    /// Short machine-readable tag for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Pm25Error::MissingParameter(_) => "missing_parameter",
            Pm25Error::InvalidParameter { .. } => "invalid_parameter",
            Pm25Error::InvalidDate { .. } => "invalid_date",
            Pm25Error::DataNotAvailable(_) => "data_not_available",
            Pm25Error::DataReadError(_) => "data_read",
            Pm25Error::BandIndexOutOfRange { .. } => "band_index",
            Pm25Error::DataError(_) => "data",
            Pm25Error::RasterWriteError(_) => "raster_write",
            Pm25Error::ModelError(_) => "model",
            Pm25Error::RenderError(_) => "render",
            Pm25Error::StorageError(_) => "storage",
            Pm25Error::ExportError(_) => "export",
            Pm25Error::ConfigError(_) => "config",
            Pm25Error::InternalError(_) => "internal",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Pm25Error::MissingParameter(_)
            | Pm25Error::InvalidParameter { .. }
            | Pm25Error::InvalidDate { .. } => 400,

            Pm25Error::DataNotAvailable(_) => 404,

            Pm25Error::DataError(_) | Pm25Error::BandIndexOutOfRange { .. } => 422,

            Pm25Error::ExportError(_) => 502,

            _ => 500,
        }
    }

    pub fn data_read(msg: impl Into<String>) -> Self {
        Self::DataReadError(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::DataError(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }
}

impl From<std::io::Error> for Pm25Error {
    fn from(err: std::io::Error) -> Self {
        Pm25Error::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for Pm25Error {
    fn from(err: serde_json::Error) -> Self {
        Pm25Error::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = Pm25Error::InvalidDate {
            value: "2024-13-40".to_string(),
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.kind(), "invalid_date");

        assert_eq!(
            Pm25Error::DataNotAvailable("MODIS_20240101.tif".into()).http_status_code(),
            404
        );
        assert_eq!(Pm25Error::ExportError("quota".into()).http_status_code(), 502);
        assert_eq!(Pm25Error::ModelError("bad".into()).http_status_code(), 500);
    }

    #[test]
    fn test_io_error_is_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Pm25Error = io.into();
        assert_eq!(err.kind(), "internal");
    }
}
