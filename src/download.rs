//! Two-phase object download
//!
//! 1. Ask the ObjectLoadService for a signed download link
//! 2. GET that link and stream the body into the local layout
//!
//! The local layout is chosen by `PathStyle`. A non-success answer from the
//! link target is an error and leaves no file behind.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::sciobjsdb::error::{Result, SciObjsDbError};
use crate::sciobjsdb::proto::{CreateDownloadLinkRequest, Object};
use crate::sciobjsdb::StorageApi;

/// Directory between a dataset and its object groups in the canonical layout
pub const DATA_DIR: &str = "_data";

/// Local layout of downloaded objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PathStyle {
    /// `<base>/<project id>/<dataset id>/_data/<object group>/<file>`
    #[default]
    Canonical,
    /// `<base>/<object group>/<file>`
    Flat,
}

impl PathStyle {
    /// Directory receiving the objects of `group_name`
    pub fn object_group_dir(&self, base: &Path, object: &Object, group_name: &str) -> PathBuf {
        match self {
            PathStyle::Canonical => base
                .join(&object.project_id)
                .join(&object.dataset_id)
                .join(DATA_DIR)
                .join(group_name),
            PathStyle::Flat => base.join(group_name),
        }
    }

    /// Full path of `object` below `base`
    pub fn file_path(&self, base: &Path, object: &Object, group_name: &str) -> PathBuf {
        self.object_group_dir(base, object, group_name)
            .join(file_name(object))
    }
}

fn file_name(object: &Object) -> String {
    if object.filetype.is_empty() {
        object.filename.clone()
    } else {
        format!("{}.{}", object.filename, object.filetype)
    }
}

/// Where a downloaded object landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub object_id: String,
    pub path: PathBuf,
    /// Bytes written to `path`
    pub bytes: u64,
}

fn file_error(path: &Path, source: std::io::Error) -> SciObjsDbError {
    error!("Could not write '{}': {}", path.display(), source);
    SciObjsDbError::File {
        path: path.to_path_buf(),
        source,
    }
}

/// Downloads objects through signed links handed out by the service
#[derive(Debug, Clone)]
pub struct DownloadTransfer {
    http: reqwest::Client,
}

impl DownloadTransfer {
    /// Create a transfer client; `timeout` bounds each GET when set
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| {
            error!("Failed to initialise the HTTP client: {}", e);
            SciObjsDbError::Http(e)
        })?;

        Ok(DownloadTransfer { http })
    }

    /// Download `object`, a member of object group `group_name`, below `base`
    pub async fn download<A>(
        &self,
        api: &A,
        object: &Object,
        group_name: &str,
        base: &Path,
        style: PathStyle,
    ) -> Result<DownloadOutcome>
    where
        A: StorageApi + ?Sized,
    {
        // Stage 1: acquire source
        let link = api
            .create_download_link(CreateDownloadLinkRequest {
                id: object.id.clone(),
            })
            .await
            .map_err(|status| {
                error!(
                    "Could not create download link for '{}': {}",
                    object.id,
                    status.message()
                );
                SciObjsDbError::DownloadLink {
                    object_id: object.id.clone(),
                    source: Box::new(status),
                }
            })?;

        // Stage 2: transfer
        let path = style.file_path(base, object, group_name);
        let bytes = self.fetch(&link.download_link, &object.id, &path).await?;
        info!("Downloaded {} bytes for object '{}'", bytes, object.id);

        Ok(DownloadOutcome {
            object_id: object.id.clone(),
            path,
            bytes,
        })
    }

    /// GET `url` and write the body to `path`, creating parent directories
    pub async fn fetch(&self, url: &str, object_id: &str, path: &Path) -> Result<u64> {
        debug!("GET download link for '{}'", object_id);

        let mut response = self.http.get(url).send().await.map_err(|e| {
            error!("Transfer from download link failed: {}", e);
            SciObjsDbError::Transfer(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = SciObjsDbError::Download {
                object_id: object_id.to_string(),
                status,
            };
            error!("{}", err);
            return Err(err);
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|source| file_error(dir, source))?;
        }
        let mut file = File::create(path)
            .await
            .map_err(|source| file_error(path, source))?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            error!("Reading download body for '{}' failed: {}", object_id, e);
            SciObjsDbError::Transfer(e)
        })? {
            file.write_all(&chunk)
                .await
                .map_err(|source| file_error(path, source))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|source| file_error(path, source))?;

        Ok(written)
    }
}
