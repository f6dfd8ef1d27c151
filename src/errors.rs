use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Network request failed
    NetworkError(String),
    /// A listing page fetch failed, aborting discovery
    DiscoveryError(String),
    /// No candidate file matched the requested period
    NoCandidatesFound { period: String },
    /// Candidates existed but none could be selected
    NoResolvableVersion,
    /// Connection dropped while streaming a download (retried by the fetcher)
    ConnectionInterrupted(String),
    /// Download kept failing after all retry attempts
    DownloadExhausted { filename: String, attempts: u32 },
    /// File extension is not recognized for downstream conversion
    UnsupportedFileType(String),
    /// Invalid URL format
    UrlError(String),
    /// Selector parsing failed
    SelectorError(String),
    /// Invalid input format
    InvalidInput(String),
    /// IO operation failed
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NetworkError(msg) => write!(f, "Network error: {msg}"),
            AppError::DiscoveryError(msg) => write!(f, "Discovery aborted: {msg}"),
            AppError::NoCandidatesFound { period } => {
                write!(f, "No file found in the listing for period '{period}'")
            }
            AppError::NoResolvableVersion => {
                write!(f, "Could not determine the latest file version")
            }
            AppError::ConnectionInterrupted(msg) => {
                write!(f, "Connection interrupted: {msg}")
            }
            AppError::DownloadExhausted { filename, attempts } => {
                write!(f, "Could not download '{filename}' after {attempts} attempts")
            }
            AppError::UnsupportedFileType(name) => {
                write!(f, "Unsupported file type for conversion: {name}")
            }
            AppError::UrlError(msg) => write!(f, "Invalid URL: {msg}"),
            AppError::SelectorError(msg) => write!(f, "CSS selector error: {msg}"),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            AppError::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

// Conversion implementations for common errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::UrlError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Terminal outcomes are reported to the operator without aborting the
    /// process; everything else propagates as a hard failure.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppError::NoCandidatesFound { .. }
                | AppError::NoResolvableVersion
                | AppError::DownloadExhausted { .. }
        )
    }
}
