use std::path::Path;

use tracing::{debug, error, info};

use super::records::Record;
use super::request_file::{
    read_request_file, CreateDatasetFile, CreateDatasetVersionFile, CreateObjectGroupFile,
    CreateProjectFile, UpdateObjectGroupFile,
};
use super::{ResourceKind, UpdateOperation};
use crate::download::{DownloadTransfer, PathStyle};
use crate::sciobjsdb::error::{Result, SciObjsDbError};
use crate::sciobjsdb::proto::{
    CreateDatasetRequest, CreateProjectRequest, GetDatasetObjectGroupsRequest, GetDatasetRequest,
    GetDatasetVersionObjectGroupsRequest, GetDatasetVersionRequest, GetDatasetVersionsRequest,
    GetObjectGroupRequest, GetObjectGroupRevisionRequest, GetObjectGroupRevisionsRequest,
    GetProjectDatasetsRequest, GetProjectRequest, GetUserProjectsRequest, ObjectGroup,
    ReleaseDatasetVersionRequest,
};
use crate::sciobjsdb::StorageApi;
use crate::upload::UploadTransfer;

/// Lazy, single-pass sequence of listed records in service order
pub type Records = std::vec::IntoIter<Record>;

/// Log an RPC failure at the point it happens and wrap it
fn rpc_error(call: &str, status: tonic::Status) -> SciObjsDbError {
    error!("{} failed: {}", call, status.message());
    SciObjsDbError::from(status)
}

/// An empty message body from the service is reported as not found
fn not_found(call: &str, resource: ResourceKind, id: &str) -> SciObjsDbError {
    rpc_error(
        call,
        tonic::Status::not_found(format!("{} {} not found", resource, id)),
    )
}

fn unsupported(resource: ResourceKind, action: &'static str) -> SciObjsDbError {
    let err = SciObjsDbError::UnsupportedResource { resource, action };
    error!("{}", err);
    err
}

fn required_id<'a>(
    resource: ResourceKind,
    action: &'static str,
    id: Option<&'a str>,
) -> Result<&'a str> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => {
            let err = SciObjsDbError::MissingId { resource, action };
            error!("{}", err);
            Err(err)
        }
    }
}

/// Maps a resource plus an action onto the typed remote call
pub struct ResourceDispatcher<'a, A: StorageApi + ?Sized> {
    api: &'a A,
    transfer: &'a UploadTransfer,
}

impl<'a, A: StorageApi + ?Sized> ResourceDispatcher<'a, A> {
    pub fn new(api: &'a A, transfer: &'a UploadTransfer) -> Self {
        ResourceDispatcher { api, transfer }
    }

    /// List the children of `id` (or the caller's projects)
    ///
    /// | resource             | `id`            |
    /// |----------------------|-----------------|
    /// | Project              | ignored         |
    /// | Dataset              | project id      |
    /// | DatasetVersion       | dataset id      |
    /// | ObjectGroup          | dataset id      |
    /// | ObjectGroupVersion   | object group id |
    pub async fn list(&self, resource: ResourceKind, id: Option<&str>) -> Result<Records> {
        debug!("Listing {} under {:?}", resource, id);

        let records: Vec<Record> = match resource {
            ResourceKind::Project => self
                .api
                .get_user_projects(GetUserProjectsRequest {})
                .await
                .map_err(|e| rpc_error("GetUserProjects", e))?
                .projects
                .into_iter()
                .map(Record::Project)
                .collect(),
            ResourceKind::Dataset => {
                let id = required_id(resource, "list", id)?;
                self.api
                    .get_project_datasets(GetProjectDatasetsRequest { id: id.to_string() })
                    .await
                    .map_err(|e| rpc_error("GetProjectDatasets", e))?
                    .datasets
                    .into_iter()
                    .map(Record::Dataset)
                    .collect()
            }
            ResourceKind::DatasetVersion => {
                let id = required_id(resource, "list", id)?;
                self.api
                    .get_dataset_versions(GetDatasetVersionsRequest { id: id.to_string() })
                    .await
                    .map_err(|e| rpc_error("GetDatasetVersions", e))?
                    .dataset_versions
                    .into_iter()
                    .map(Record::DatasetVersion)
                    .collect()
            }
            ResourceKind::ObjectGroup => self
                .dataset_object_groups(required_id(resource, "list", id)?)
                .await?
                .into_iter()
                .map(Record::ObjectGroup)
                .collect(),
            ResourceKind::ObjectGroupVersion => {
                let id = required_id(resource, "list", id)?;
                self.api
                    .get_object_group_revisions(GetObjectGroupRevisionsRequest {
                        id: id.to_string(),
                    })
                    .await
                    .map_err(|e| rpc_error("GetObjectGroupRevisions", e))?
                    .object_group_revisions
                    .into_iter()
                    .map(Record::ObjectGroupRevision)
                    .collect()
            }
        };

        Ok(records.into_iter())
    }

    /// List the object group revisions frozen into dataset version `id`
    pub async fn list_version_object_groups(&self, id: Option<&str>) -> Result<Records> {
        let id = required_id(ResourceKind::DatasetVersion, "list", id)?;
        debug!("Listing object groups of dataset version {}", id);

        let records: Vec<Record> = self
            .api
            .get_dataset_version_object_groups(GetDatasetVersionObjectGroupsRequest {
                id: id.to_string(),
            })
            .await
            .map_err(|e| rpc_error("GetDatasetVersionObjectGroups", e))?
            .object_group_revisions
            .into_iter()
            .map(Record::ObjectGroupRevision)
            .collect();

        Ok(records.into_iter())
    }

    /// Fetch a single entity by id
    pub async fn describe(&self, resource: ResourceKind, id: Option<&str>) -> Result<Record> {
        let id = required_id(resource, "describe", id)?.to_string();
        debug!("Describing {} {}", resource, id);

        match resource {
            ResourceKind::Project => self
                .api
                .get_project(GetProjectRequest { id: id.clone() })
                .await
                .map_err(|e| rpc_error("GetProject", e))?
                .project
                .map(Record::Project)
                .ok_or_else(|| not_found("GetProject", resource, &id)),
            ResourceKind::Dataset => self
                .api
                .get_dataset(GetDatasetRequest { id: id.clone() })
                .await
                .map_err(|e| rpc_error("GetDataset", e))?
                .dataset
                .map(Record::Dataset)
                .ok_or_else(|| not_found("GetDataset", resource, &id)),
            ResourceKind::DatasetVersion => self
                .api
                .get_dataset_version(GetDatasetVersionRequest { id: id.clone() })
                .await
                .map_err(|e| rpc_error("GetDatasetVersion", e))?
                .dataset_version
                .map(Record::DatasetVersion)
                .ok_or_else(|| not_found("GetDatasetVersion", resource, &id)),
            ResourceKind::ObjectGroup => self
                .object_group(&id)
                .await
                .map(Record::ObjectGroup),
            ResourceKind::ObjectGroupVersion => self
                .api
                .get_object_group_revision(GetObjectGroupRevisionRequest { id: id.clone() })
                .await
                .map_err(|e| rpc_error("GetObjectGroupRevision", e))?
                .object_group_revision
                .map(Record::ObjectGroupRevision)
                .ok_or_else(|| not_found("GetObjectGroupRevision", resource, &id)),
        }
    }

    /// Create a resource from the request file at `path`.
    ///
    /// The file is decoded before any remote call is made. For object groups
    /// the files listed under `object_files` are uploaded once the group
    /// exists; the returned records list the group then each uploaded object.
    pub async fn create(&self, resource: ResourceKind, path: &Path) -> Result<Vec<Record>> {
        let id = match resource {
            ResourceKind::Project => {
                let file: CreateProjectFile = read_request_file(path).await?;
                self.api
                    .create_project(CreateProjectRequest::from(file))
                    .await
                    .map_err(|e| rpc_error("CreateProject", e))?
                    .id
            }
            ResourceKind::Dataset => {
                let file: CreateDatasetFile = read_request_file(path).await?;
                self.api
                    .create_dataset(CreateDatasetRequest::from(file))
                    .await
                    .map_err(|e| rpc_error("CreateDataset", e))?
                    .id
            }
            ResourceKind::DatasetVersion => {
                let file: CreateDatasetVersionFile = read_request_file(path).await?;
                self.api
                    .release_dataset_version(ReleaseDatasetVersionRequest::from(file))
                    .await
                    .map_err(|e| rpc_error("ReleaseDatasetVersion", e))?
                    .id
            }
            ResourceKind::ObjectGroup => return self.create_object_group(path).await,
            ResourceKind::ObjectGroupVersion => return Err(unsupported(resource, "create")),
        };

        Ok(vec![Record::Created { resource, id }])
    }

    async fn create_object_group(&self, path: &Path) -> Result<Vec<Record>> {
        let file: CreateObjectGroupFile = read_request_file(path).await?;
        let request = file.to_request().await?;

        let response = self
            .api
            .create_object_group(request)
            .await
            .map_err(|e| rpc_error("CreateObjectGroup", e))?;

        let mut records = vec![Record::Created {
            resource: ResourceKind::ObjectGroup,
            id: response.object_group_id,
        }];

        // Links index into the request's objects; file-backed ones come first
        for link in response.object_links {
            let Some(spec) = usize::try_from(link.index)
                .ok()
                .and_then(|index| file.object_files.get(index))
            else {
                debug!("No local file for object link {}", link.index);
                continue;
            };

            let outcome = self
                .transfer
                .upload(self.api, &spec.path, &link.object_id)
                .await?;
            records.push(Record::from(outcome));
        }

        Ok(records)
    }

    /// Add or remove the objects listed in the request file at `path`,
    /// producing a new revision of the object group
    pub async fn update(&self, operation: UpdateOperation, path: &Path) -> Result<Record> {
        let file: UpdateObjectGroupFile = read_request_file(path).await?;
        if file.object_ids.is_empty() {
            let err = SciObjsDbError::Decode {
                path: path.to_path_buf(),
                reason: "object_ids must name at least one object".to_string(),
            };
            error!("{}", err);
            return Err(err);
        }

        let response = self
            .api
            .update_object_group(file.to_request(operation))
            .await
            .map_err(|e| rpc_error("UpdateObjectGroup", e))?;
        info!(
            "Object group '{}' is now at revision {}",
            response.object_group_id, response.revision
        );

        Ok(Record::Updated {
            object_group_id: response.object_group_id,
            revision_id: response.revision_id,
            revision: response.revision,
        })
    }

    /// Download every object below resource `id` into `base`.
    ///
    /// | resource    | downloads                                   |
    /// |-------------|---------------------------------------------|
    /// | Project     | objects of every dataset's object groups    |
    /// | Dataset     | objects of every object group               |
    /// | ObjectGroup | objects of the group's current revision     |
    ///
    /// Objects are fetched one at a time and the first failure stops the run.
    pub async fn load(
        &self,
        downloads: &DownloadTransfer,
        resource: ResourceKind,
        id: Option<&str>,
        base: &Path,
        style: PathStyle,
    ) -> Result<Vec<Record>> {
        let id = required_id(resource, "load", id)?;
        debug!("Loading {} {} into '{}'", resource, id, base.display());

        let groups = match resource {
            ResourceKind::Project => {
                let datasets = self
                    .api
                    .get_project_datasets(GetProjectDatasetsRequest { id: id.to_string() })
                    .await
                    .map_err(|e| rpc_error("GetProjectDatasets", e))?
                    .datasets;

                let mut groups = Vec::new();
                for dataset in datasets {
                    groups.extend(self.dataset_object_groups(&dataset.id).await?);
                }
                groups
            }
            ResourceKind::Dataset => self.dataset_object_groups(id).await?,
            ResourceKind::ObjectGroup => vec![self.object_group(id).await?],
            ResourceKind::DatasetVersion | ResourceKind::ObjectGroupVersion => {
                return Err(unsupported(resource, "load"))
            }
        };

        let mut records = Vec::new();
        for group in &groups {
            for object in &group.objects {
                let outcome = downloads
                    .download(self.api, object, &group.name, base, style)
                    .await?;
                records.push(Record::from(outcome));
            }
        }

        Ok(records)
    }

    async fn dataset_object_groups(&self, dataset_id: &str) -> Result<Vec<ObjectGroup>> {
        Ok(self
            .api
            .get_dataset_object_groups(GetDatasetObjectGroupsRequest {
                id: dataset_id.to_string(),
            })
            .await
            .map_err(|e| rpc_error("GetDatasetObjectGroups", e))?
            .object_groups)
    }

    async fn object_group(&self, id: &str) -> Result<ObjectGroup> {
        self.api
            .get_object_group(GetObjectGroupRequest { id: id.to_string() })
            .await
            .map_err(|e| rpc_error("GetObjectGroup", e))?
            .object_group
            .ok_or_else(|| not_found("GetObjectGroup", ResourceKind::ObjectGroup, id))
    }
}
