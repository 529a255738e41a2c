use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeisError {
    #[error("Signal is empty")]
    EmptySignal,

    #[error("Signal too short: {len} samples, basis '{wavelet}' needs at least {required} for level {level}")]
    SignalTooShort {
        len: usize,
        required: usize,
        wavelet: String,
        level: usize,
    },

    #[error("Unknown wavelet: {0}")]
    UnknownWavelet(String),

    #[error("Unknown extension mode: {0}")]
    UnknownExtensionMode(String),

    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerically degenerate input: {0}")]
    Degenerate(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Could not find station '{0}' in inventory")]
    StationNotFound(String),

    #[error("Could not find channel '{0}' in inventory")]
    ChannelNotFound(String),

    #[error("Could not find origin for method '{0}'")]
    OriginNotFound(String),

    #[error("Could not find focal mechanism for method '{0}'")]
    FocalMechanismNotFound(String),

    #[error("Could not find moment tensor: {0}")]
    MomentTensorNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SeisError>;
