use thiserror::Error;

#[derive(Error, Debug)]
pub enum CashFlowError {
    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Malformed {kind} record: {details}")]
    MalformedRecord { kind: String, details: String },

    #[error("Exchange rate table incomplete: {received} of {expected} rates received")]
    IncompleteRates { received: usize, expected: usize },

    #[error("Record arrival incomplete: the {0} pair has not completed")]
    IncompleteArrival(&'static str),

    #[error("Source error: {0}")]
    SourceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "remote")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CashFlowError>;
