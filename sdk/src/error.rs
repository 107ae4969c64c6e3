use crate::clients::{HttpStatusCode, StatusCode};
use snafu::Snafu;
use std::path::PathBuf;

/// The `Result` type returned by the SDK.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for every SDK operation.
///
/// Variants fall into a small taxonomy: configuration problems are raised while the client is
/// constructed, validation and precondition problems are raised before any request is sent, `Api`
/// carries a failed server response, and `Timeout`/`Cancelled` end a task wait. Nothing in the SDK
/// retries on any of them.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Invalid auth: {}.", body))]
    Authentication { body: String },

    #[snafu(display("API error {}: {}", status, message))]
    Api { status: u16, message: String },

    #[snafu(display("Unable to locate cacert file at {}.", path.display()))]
    CaCertNotFound { path: PathBuf },

    #[snafu(display("Wait for task '{}' was cancelled", task))]
    Cancelled { task: String },

    #[snafu(display("Unable to deserialize {}: {}", what, source))]
    Deserialize {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to build HTTP client: {}", source))]
    HttpClientBuild { source: reqwest::Error },

    #[snafu(display("Invalid value for header '{}': {}", name, source))]
    HeaderValue {
        name: String,
        source: reqwest::header::InvalidHeaderValue,
    },

    #[snafu(display("{}", message))]
    IllegalArgument { message: String },

    #[snafu(display("Provide either token or username and password."))]
    MissingCredentials,

    #[snafu(display("{} is missing field \"{}\"", kind, field))]
    MissingField { kind: String, field: String },

    #[snafu(display("Task '{}' has no build yet", task))]
    NoBuild { task: String },

    #[snafu(display("Task '{}' is already running as build '{}'", task, build))]
    AlreadyRunning { task: String, build: String },

    #[snafu(display("{} not found.", what))]
    NotFound { what: String },

    #[snafu(display("Unable to serialize {}: {}", what, source))]
    Serialize {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("Task '{}' did not complete within {} seconds", task, seconds))]
    Timeout { task: String, seconds: u64 },

    #[snafu(display("Invalid TLS {}: {}", what, source))]
    TlsConfig {
        what: String,
        source: reqwest::Error,
    },

    #[snafu(display("Unable to read {} '{}': {}", what, path.display(), source))]
    TlsFile {
        what: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to {} {}: {}", method, url, source))]
    Transport {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    #[snafu(display("Unable to {}: {}", action, source))]
    Yaml {
        action: String,
        source: serde_yaml::Error,
    },
}

impl Error {
    /// The raw status code of an `Api` error.
    pub fn api_status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => StatusCode::from_u16(*status).ok(),
            Error::Transport { source, .. } => source.status_code(),
            _ => None,
        }
    }
}
