//! Two-phase object upload
//!
//! 1. Open the local file
//! 2. Ask the ObjectLoadService for a signed, single-use upload link
//! 3. PUT the whole file to that link with an explicit `Content-Length`
//!
//! Each stage fails fast with its own error. A non-success status from the
//! PUT is logged and reported in the outcome but is not an error.

use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, StatusCode};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

use crate::sciobjsdb::error::{Result, SciObjsDbError};
use crate::sciobjsdb::proto::CreateUploadLinkRequest;
use crate::sciobjsdb::StorageApi;

/// What the signed-URL target answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub object_id: String,
    pub status: StatusCode,
    /// Bytes declared in `Content-Length`
    pub content_length: u64,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Uploads local files through signed links handed out by the service
#[derive(Debug, Clone)]
pub struct UploadTransfer {
    http: reqwest::Client,
}

impl UploadTransfer {
    /// Create a transfer client; `timeout` bounds each PUT when set
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| {
            error!("Failed to initialise the HTTP client: {}", e);
            SciObjsDbError::Http(e)
        })?;

        Ok(UploadTransfer { http })
    }

    /// Upload the file at `path` as the data of object `object_id`
    pub async fn upload<A>(&self, api: &A, path: &Path, object_id: &str) -> Result<TransferOutcome>
    where
        A: StorageApi + ?Sized,
    {
        // Stage 1: open source
        let file = File::open(path).await.map_err(|source| {
            error!("Could not open '{}': {}", path.display(), source);
            SciObjsDbError::File {
                path: path.to_path_buf(),
                source,
            }
        })?;

        // Stage 2: acquire target
        let link = api
            .create_upload_link(CreateUploadLinkRequest {
                id: object_id.to_string(),
            })
            .await
            .map_err(|status| {
                error!(
                    "Could not create upload link for '{}': {}",
                    object_id,
                    status.message()
                );
                SciObjsDbError::UploadLink {
                    object_id: object_id.to_string(),
                    source: Box::new(status),
                }
            })?;

        // Stage 3: transfer
        let size = file
            .metadata()
            .await
            .map_err(|source| {
                error!("Could not stat '{}': {}", path.display(), source);
                SciObjsDbError::File {
                    path: path.to_path_buf(),
                    source,
                }
            })?
            .len();

        let status = self.transfer(file, size, &link.upload_link).await?;

        if !status.is_success() {
            warn!(
                "Bad upload response for object '{}': {}",
                object_id, status
            );
        } else {
            info!("Uploaded {} bytes for object '{}'", size, object_id);
        }

        Ok(TransferOutcome {
            object_id: object_id.to_string(),
            status,
            content_length: size,
        })
    }

    async fn transfer(&self, file: File, size: u64, url: &str) -> Result<StatusCode> {
        debug!("PUT {} bytes to upload link", size);

        let response = self
            .http
            .put(url)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .map_err(|e| {
                error!("Transfer to upload link failed: {}", e);
                SciObjsDbError::Transfer(e)
            })?;

        Ok(response.status())
    }
}
