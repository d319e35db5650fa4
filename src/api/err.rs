/// Errors surfaced by the API client and the view models.
///
/// The `Display` text is what a view copies into its `error` field, so the
/// server and validation variants print their message verbatim.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// required form data missing or malformed, detected before any request
    #[error("{0}")]
    Validation(String),
    /// the request never produced a response
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// the server answered with a non-success status
    #[error("{message}")]
    Server { status: u16, message: String },
    /// the response body did not match the expected record shape
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    /// bad or missing configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
    /// csv export failure
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    /// file write failure
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
    /// regex related errors
    #[error("failed to parse or compile a regular expression: {0}")]
    Regex(#[from] regex::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
