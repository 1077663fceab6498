use std::path::PathBuf;

use thiserror::Error;

use crate::resources::ResourceKind;

/// Errors that can occur when talking to the ScienceObjectsDB services
#[derive(Debug, Error)]
pub enum SciObjsDbError {
    /// Dialing the endpoint or establishing the channel failed
    #[error("Connection error: failed to connect to '{endpoint}': {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// Configuration error (missing endpoint, unreadable config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication material could not be turned into request metadata
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A local file could not be opened, read or stat'ed
    #[error("File error on '{}': {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A request file does not match the schema of the targeted create call
    #[error("Could not decode request file '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// A remote call failed; the status message is kept verbatim
    #[error("gRPC error ({}): {}", .0.code(), .0.message())]
    Rpc(Box<tonic::Status>),

    /// The service refused to hand out an upload link
    #[error("Could not create upload link for object '{object_id}': {}", source.message())]
    UploadLink {
        object_id: String,
        source: Box<tonic::Status>,
    },

    /// Rendered results could not be written to the output
    #[error("Could not write output: {0}")]
    Output(#[source] std::io::Error),

    /// The service refused to hand out a download link
    #[error("Could not create download link for object '{object_id}': {}", source.message())]
    DownloadLink {
        object_id: String,
        source: Box<tonic::Status>,
    },

    /// The download target answered with a non-success status
    #[error("Download of object '{object_id}' answered {status}")]
    Download {
        object_id: String,
        status: reqwest::StatusCode,
    },

    /// The signed-URL transfer could not be sent or its body not read
    #[error("Transfer over signed link failed: {0}")]
    Transfer(#[source] reqwest::Error),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[source] reqwest::Error),

    /// The resource name does not map to any known resource
    #[error("could not find resource {0}")]
    UnknownResource(String),

    /// The resource is known but does not offer the requested action
    #[error("resource {resource} does not support {action}")]
    UnsupportedResource {
        resource: ResourceKind,
        action: &'static str,
    },

    /// The action on this resource needs a parent/resource id
    #[error("an id is required to {action} {resource}")]
    MissingId {
        resource: ResourceKind,
        action: &'static str,
    },
}

impl From<tonic::Status> for SciObjsDbError {
    fn from(status: tonic::Status) -> Self {
        SciObjsDbError::Rpc(Box::new(status))
    }
}

/// Type alias for Results using SciObjsDbError
pub type Result<T> = std::result::Result<T, SciObjsDbError>;
