use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid departure time: {0}")]
    InvalidTimestamp(String),
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
