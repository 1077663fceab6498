//! Request files for the create and update calls
//!
//! A request file is read whole, then decoded as JSON (`.json`) or YAML
//! (anything else). Unknown fields are rejected so a file written for one
//! resource does not silently decode as another.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use super::UpdateOperation;
use crate::sciobjsdb::error::{Result, SciObjsDbError};
use crate::sciobjsdb::proto::{
    AddObjectRequest, CreateDatasetRequest, CreateObjectGroupRequest, CreateObjectRequest,
    CreateProjectRequest, DeleteObjectRequest, Label, ReleaseDatasetVersionRequest,
    UpdateObjectGroupRequest, UpdateObjectsRequests, Version,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelSpec {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDatasetFile {
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionSpec {
    #[serde(default)]
    pub major: i32,
    #[serde(default)]
    pub minor: i32,
    #[serde(default)]
    pub patch: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDatasetVersionFile {
    pub name: String,
    pub dataset_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
    #[serde(default)]
    pub version: VersionSpec,
    /// Object group revisions frozen into the version
    #[serde(default, alias = "objects_ids")]
    pub object_group_revision_ids: Vec<String>,
}

/// Objects to add to or remove from an object group
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateObjectGroupFile {
    #[serde(alias = "objectgroup_id")]
    pub object_group_id: String,
    /// Informational only; the object group id is authoritative
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(alias = "objects_ids")]
    pub object_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateObjectGroupFile {
    pub name: String,
    pub dataset_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
    /// Objects described inline; their data is uploaded separately
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    /// Local files to register as objects and upload after creation
    #[serde(default)]
    pub object_files: Vec<ObjectFileSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    pub filename: String,
    #[serde(default)]
    pub filetype: String,
    pub content_len: i64,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectFileSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
}

impl From<LabelSpec> for Label {
    fn from(label: LabelSpec) -> Self {
        Label {
            key: label.key,
            value: label.value,
        }
    }
}

fn labels(specs: Vec<LabelSpec>) -> Vec<Label> {
    specs.into_iter().map(Label::from).collect()
}

impl From<CreateProjectFile> for CreateProjectRequest {
    fn from(file: CreateProjectFile) -> Self {
        CreateProjectRequest {
            name: file.name,
            description: file.description,
            labels: labels(file.labels),
        }
    }
}

impl From<CreateDatasetFile> for CreateDatasetRequest {
    fn from(file: CreateDatasetFile) -> Self {
        CreateDatasetRequest {
            name: file.name,
            project_id: file.project_id,
            description: file.description,
            labels: labels(file.labels),
        }
    }
}

impl From<CreateDatasetVersionFile> for ReleaseDatasetVersionRequest {
    fn from(file: CreateDatasetVersionFile) -> Self {
        ReleaseDatasetVersionRequest {
            name: file.name,
            dataset_id: file.dataset_id,
            description: file.description,
            labels: labels(file.labels),
            version: Some(Version {
                major: file.version.major,
                minor: file.version.minor,
                patch: file.version.patch,
            }),
            object_group_revision_ids: file.object_group_revision_ids,
        }
    }
}

impl UpdateObjectGroupFile {
    /// Build the revision-creating update for `operation`
    pub fn to_request(&self, operation: UpdateOperation) -> UpdateObjectGroupRequest {
        let ids = self.object_ids.iter().cloned();
        let update_objects = match operation {
            UpdateOperation::Add => UpdateObjectsRequests {
                add_objects: ids.map(|id| AddObjectRequest { id }).collect(),
                ..Default::default()
            },
            UpdateOperation::Delete => UpdateObjectsRequests {
                delete_objects: ids.map(|id| DeleteObjectRequest { id }).collect(),
                ..Default::default()
            },
        };

        UpdateObjectGroupRequest {
            id: self.object_group_id.clone(),
            update_objects: Some(update_objects),
        }
    }
}

impl From<ObjectSpec> for CreateObjectRequest {
    fn from(object: ObjectSpec) -> Self {
        CreateObjectRequest {
            filename: object.filename,
            filetype: object.filetype,
            content_len: object.content_len,
            labels: labels(object.labels),
        }
    }
}

impl ObjectFileSpec {
    /// Describe the local file as an object: stem, extension and byte size
    pub async fn to_create_request(&self) -> Result<CreateObjectRequest> {
        let metadata = tokio::fs::metadata(&self.path).await.map_err(|source| {
            error!("Could not stat '{}': {}", self.path.display(), source);
            SciObjsDbError::File {
                path: self.path.clone(),
                source,
            }
        })?;

        let content_len = i64::try_from(metadata.len()).map_err(|_| {
            let err = SciObjsDbError::Decode {
                path: self.path.clone(),
                reason: format!("file size {} does not fit a content length", metadata.len()),
            };
            error!("{}", err);
            err
        })?;

        let filename = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filetype = self
            .path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(CreateObjectRequest {
            filename,
            filetype,
            content_len,
            labels: labels(self.labels.clone()),
        })
    }
}

impl CreateObjectGroupFile {
    /// Build the create call; file-backed objects come first so that the
    /// returned link indices line up with `object_files`.
    pub async fn to_request(&self) -> Result<CreateObjectGroupRequest> {
        let mut objects = Vec::with_capacity(self.object_files.len() + self.objects.len());
        for file in &self.object_files {
            objects.push(file.to_create_request().await?);
        }
        objects.extend(self.objects.iter().cloned().map(CreateObjectRequest::from));

        Ok(CreateObjectGroupRequest {
            name: self.name.clone(),
            dataset_id: self.dataset_id.clone(),
            description: self.description.clone(),
            labels: labels(self.labels.clone()),
            objects,
            include_object_link: !self.object_files.is_empty(),
        })
    }
}

/// Decode request file contents, choosing the format from the extension
pub fn decode<T: DeserializeOwned>(path: &Path, data: &str) -> Result<T> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let decoded = if is_json {
        serde_json::from_str(data).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(data).map_err(|e| e.to_string())
    };

    decoded.map_err(|reason| {
        error!("Could not decode '{}': {}", path.display(), reason);
        SciObjsDbError::Decode {
            path: path.to_path_buf(),
            reason,
        }
    })
}

/// Read a request file fully into memory and decode it
pub async fn read_request_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Reading request file '{}'", path.display());
    let data = tokio::fs::read_to_string(path).await.map_err(|source| {
        error!("Could not read '{}': {}", path.display(), source);
        SciObjsDbError::File {
            path: path.to_path_buf(),
            source,
        }
    })?;

    decode(path, &data)
}
