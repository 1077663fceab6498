//! In-process storage service for the integration tests
//!
//! Serves all four services from fixed fixtures on an ephemeral loopback port
//! and records the metadata of every call it receives.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::metadata::MetadataMap;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use sciobjsdb_cli::config::{Config, EndpointConfig};
use sciobjsdb_cli::sciobjsdb::proto::dataset_objects_service_server::{
    DatasetObjectsService, DatasetObjectsServiceServer,
};
use sciobjsdb_cli::sciobjsdb::proto::dataset_service_server::{
    DatasetService, DatasetServiceServer,
};
use sciobjsdb_cli::sciobjsdb::proto::object_load_service_server::{
    ObjectLoadService, ObjectLoadServiceServer,
};
use sciobjsdb_cli::sciobjsdb::proto::project_service_server::{
    ProjectService, ProjectServiceServer,
};
use sciobjsdb_cli::sciobjsdb::proto::*;

pub const PROJECT_ID: &str = "project-42";

/// Dataset names served for `PROJECT_ID`, in service order
pub const DATASET_NAMES: [&str; 3] = ["raw-reads", "aligned", "annotations"];

/// The only object group, held by `dataset-0`
pub const OBJECT_GROUP_ID: &str = "group-run1";

/// Objects of `OBJECT_GROUP_ID` as (id, filename, filetype)
pub const OBJECTS: [(&str, &str, &str); 2] =
    [("obj-a", "reads", "fastq"), ("obj-b", "notes", "txt")];

/// The only dataset version, released from `dataset-0`
pub const DATASET_VERSION_ID: &str = "version-1";

#[derive(Debug, Clone, Default)]
pub struct FakeStorage {
    /// Base URL the upload and download links point at
    pub link_base: String,
    calls: Arc<Mutex<Vec<(String, MetadataMap)>>>,
    updates: Arc<Mutex<Vec<UpdateObjectGroupRequest>>>,
}

impl FakeStorage {
    pub fn new(link_base: impl Into<String>) -> Self {
        FakeStorage {
            link_base: link_base.into(),
            calls: Arc::default(),
            updates: Arc::default(),
        }
    }

    /// Update requests received so far
    pub fn updates(&self) -> Vec<UpdateObjectGroupRequest> {
        self.updates.lock().unwrap().clone()
    }

    fn record<T>(&self, call: &str, request: &Request<T>) {
        self.calls
            .lock()
            .unwrap()
            .push((call.to_string(), request.metadata().clone()));
    }

    /// Names of the calls received so far
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// Value of metadata `key` on the most recent call
    pub fn last_metadata(&self, key: &str) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .and_then(|(_, metadata)| metadata.get(key))
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    fn datasets() -> Vec<Dataset> {
        DATASET_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| Dataset {
                id: format!("dataset-{}", i),
                name: name.to_string(),
                project_id: PROJECT_ID.to_string(),
                status: EntityStatus::Available as i32,
                ..Default::default()
            })
            .collect()
    }

    fn object_group() -> ObjectGroup {
        ObjectGroup {
            id: OBJECT_GROUP_ID.to_string(),
            name: "run1".to_string(),
            dataset_id: "dataset-0".to_string(),
            status: EntityStatus::Available as i32,
            revision_counter: 1,
            objects: OBJECTS
                .iter()
                .map(|(id, filename, filetype)| Object {
                    id: id.to_string(),
                    filename: filename.to_string(),
                    filetype: filetype.to_string(),
                    dataset_id: "dataset-0".to_string(),
                    project_id: PROJECT_ID.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn dataset_version() -> DatasetVersion {
        DatasetVersion {
            id: DATASET_VERSION_ID.to_string(),
            dataset_id: "dataset-0".to_string(),
            name: "release-1".to_string(),
            version: Some(Version {
                major: 1,
                minor: 0,
                patch: 0,
            }),
            object_group_revision_ids: vec!["revision-1".to_string()],
            status: EntityStatus::Available as i32,
            ..Default::default()
        }
    }
}

#[tonic::async_trait]
impl ProjectService for FakeStorage {
    async fn create_project(
        &self,
        request: Request<CreateProjectRequest>,
    ) -> Result<Response<CreateProjectResponse>, Status> {
        self.record("CreateProject", &request);
        Ok(Response::new(CreateProjectResponse {
            id: format!("project-{}", request.into_inner().name),
        }))
    }

    async fn get_project(
        &self,
        request: Request<GetProjectRequest>,
    ) -> Result<Response<GetProjectResponse>, Status> {
        self.record("GetProject", &request);
        let id = request.into_inner().id;
        if id != PROJECT_ID {
            return Err(Status::not_found(format!("project {} not found", id)));
        }
        Ok(Response::new(GetProjectResponse {
            project: Some(Project {
                id,
                name: "genomes".to_string(),
                description: "shared genomes".to_string(),
                ..Default::default()
            }),
        }))
    }

    async fn get_user_projects(
        &self,
        request: Request<GetUserProjectsRequest>,
    ) -> Result<Response<GetUserProjectsResponse>, Status> {
        self.record("GetUserProjects", &request);
        Ok(Response::new(GetUserProjectsResponse {
            projects: vec![Project {
                id: PROJECT_ID.to_string(),
                name: "genomes".to_string(),
                ..Default::default()
            }],
        }))
    }

    async fn get_project_datasets(
        &self,
        request: Request<GetProjectDatasetsRequest>,
    ) -> Result<Response<GetProjectDatasetsResponse>, Status> {
        self.record("GetProjectDatasets", &request);
        let datasets = if request.get_ref().id == PROJECT_ID {
            Self::datasets()
        } else {
            Vec::new()
        };
        Ok(Response::new(GetProjectDatasetsResponse { datasets }))
    }
}

#[tonic::async_trait]
impl DatasetService for FakeStorage {
    async fn create_dataset(
        &self,
        request: Request<CreateDatasetRequest>,
    ) -> Result<Response<CreateDatasetResponse>, Status> {
        self.record("CreateDataset", &request);
        Ok(Response::new(CreateDatasetResponse {
            id: format!("dataset-{}", request.into_inner().name),
        }))
    }

    async fn get_dataset(
        &self,
        request: Request<GetDatasetRequest>,
    ) -> Result<Response<GetDatasetResponse>, Status> {
        self.record("GetDataset", &request);
        let id = request.into_inner().id;
        Ok(Response::new(GetDatasetResponse {
            dataset: Self::datasets().into_iter().find(|dataset| dataset.id == id),
        }))
    }

    async fn get_dataset_object_groups(
        &self,
        request: Request<GetDatasetObjectGroupsRequest>,
    ) -> Result<Response<GetDatasetObjectGroupsResponse>, Status> {
        self.record("GetDatasetObjectGroups", &request);
        let object_groups = if request.get_ref().id == "dataset-0" {
            vec![Self::object_group()]
        } else {
            Vec::new()
        };
        Ok(Response::new(GetDatasetObjectGroupsResponse { object_groups }))
    }

    async fn release_dataset_version(
        &self,
        request: Request<ReleaseDatasetVersionRequest>,
    ) -> Result<Response<ReleaseDatasetVersionResponse>, Status> {
        self.record("ReleaseDatasetVersion", &request);
        Ok(Response::new(ReleaseDatasetVersionResponse {
            id: format!("version-{}", request.into_inner().name),
        }))
    }

    async fn get_dataset_version(
        &self,
        request: Request<GetDatasetVersionRequest>,
    ) -> Result<Response<GetDatasetVersionResponse>, Status> {
        self.record("GetDatasetVersion", &request);
        let dataset_version = Some(Self::dataset_version())
            .filter(|version| version.id == request.get_ref().id);
        Ok(Response::new(GetDatasetVersionResponse { dataset_version }))
    }

    async fn get_dataset_versions(
        &self,
        request: Request<GetDatasetVersionsRequest>,
    ) -> Result<Response<GetDatasetVersionsResponse>, Status> {
        self.record("GetDatasetVersions", &request);
        let dataset_versions = if request.get_ref().id == "dataset-0" {
            vec![Self::dataset_version()]
        } else {
            Vec::new()
        };
        Ok(Response::new(GetDatasetVersionsResponse { dataset_versions }))
    }

    async fn get_dataset_version_object_groups(
        &self,
        request: Request<GetDatasetVersionObjectGroupsRequest>,
    ) -> Result<Response<GetDatasetVersionObjectGroupsResponse>, Status> {
        self.record("GetDatasetVersionObjectGroups", &request);
        if request.get_ref().id != DATASET_VERSION_ID {
            return Err(Status::not_found("dataset version not found"));
        }
        let group = Self::object_group();
        Ok(Response::new(GetDatasetVersionObjectGroupsResponse {
            object_group_revisions: vec![ObjectGroupRevision {
                id: "revision-1".to_string(),
                object_group_id: group.id,
                revision: 1,
                objects: group.objects,
                status: EntityStatus::Available as i32,
                ..Default::default()
            }],
        }))
    }
}

#[tonic::async_trait]
impl DatasetObjectsService for FakeStorage {
    async fn create_object_group(
        &self,
        request: Request<CreateObjectGroupRequest>,
    ) -> Result<Response<CreateObjectGroupResponse>, Status> {
        self.record("CreateObjectGroup", &request);
        let request = request.into_inner();
        let object_links = if request.include_object_link {
            (0..request.objects.len())
                .map(|index| ObjectLink {
                    index: index as i64,
                    object_id: format!("obj-{}", index),
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Response::new(CreateObjectGroupResponse {
            object_group_id: format!("group-{}", request.name),
            revision_id: "revision-1".to_string(),
            object_links,
        }))
    }

    async fn get_object_group(
        &self,
        request: Request<GetObjectGroupRequest>,
    ) -> Result<Response<GetObjectGroupResponse>, Status> {
        self.record("GetObjectGroup", &request);
        let object_group =
            Some(Self::object_group()).filter(|group| group.id == request.get_ref().id);
        Ok(Response::new(GetObjectGroupResponse { object_group }))
    }

    async fn get_object_group_revisions(
        &self,
        request: Request<GetObjectGroupRevisionsRequest>,
    ) -> Result<Response<GetObjectGroupRevisionsResponse>, Status> {
        self.record("GetObjectGroupRevisions", &request);
        Ok(Response::new(GetObjectGroupRevisionsResponse::default()))
    }

    async fn get_object_group_revision(
        &self,
        request: Request<GetObjectGroupRevisionRequest>,
    ) -> Result<Response<GetObjectGroupRevisionResponse>, Status> {
        self.record("GetObjectGroupRevision", &request);
        Ok(Response::new(GetObjectGroupRevisionResponse::default()))
    }

    async fn update_object_group(
        &self,
        request: Request<UpdateObjectGroupRequest>,
    ) -> Result<Response<UpdateObjectGroupResponse>, Status> {
        self.record("UpdateObjectGroup", &request);
        let request = request.into_inner();
        if request.id != OBJECT_GROUP_ID {
            return Err(Status::not_found(format!(
                "object group {} not found",
                request.id
            )));
        }
        self.updates.lock().unwrap().push(request);

        Ok(Response::new(UpdateObjectGroupResponse {
            object_group_id: OBJECT_GROUP_ID.to_string(),
            revision_id: "revision-2".to_string(),
            revision: 2,
        }))
    }
}

#[tonic::async_trait]
impl ObjectLoadService for FakeStorage {
    async fn create_upload_link(
        &self,
        request: Request<CreateUploadLinkRequest>,
    ) -> Result<Response<CreateUploadLinkResponse>, Status> {
        self.record("CreateUploadLink", &request);
        let id = request.into_inner().id;
        Ok(Response::new(CreateUploadLinkResponse {
            upload_link: format!("{}/{}?sig=X", self.link_base, id),
            object: Some(Object {
                id,
                ..Default::default()
            }),
        }))
    }

    async fn create_download_link(
        &self,
        request: Request<CreateDownloadLinkRequest>,
    ) -> Result<Response<CreateDownloadLinkResponse>, Status> {
        self.record("CreateDownloadLink", &request);
        let id = request.into_inner().id;
        let object = Self::object_group()
            .objects
            .into_iter()
            .find(|object| object.id == id)
            .ok_or_else(|| Status::not_found(format!("object {} not found", id)))?;

        Ok(Response::new(CreateDownloadLinkResponse {
            download_link: format!("{}/download/{}?sig=Y", self.link_base, id),
            object: Some(object),
        }))
    }
}

/// Serve `storage` on an ephemeral loopback port
pub async fn spawn_server(storage: FakeStorage) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(ProjectServiceServer::new(storage.clone()))
            .add_service(DatasetServiceServer::new(storage.clone()))
            .add_service(DatasetObjectsServiceServer::new(storage.clone()))
            .add_service(ObjectLoadServiceServer::new(storage))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    addr
}

/// Configuration pointing at a local server, without credentials
pub fn local_config(addr: SocketAddr) -> Config {
    Config {
        endpoint: EndpointConfig {
            host: "127.0.0.1".to_string(),
            port: addr.port(),
            timeout: Some(10),
        },
        ..Default::default()
    }
}
