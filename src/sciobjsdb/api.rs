//! Remote operations consumed by the dispatcher and the transfers
//!
//! `ClientBundle` is the production implementation. Each call clones the stub
//! (a cheap handle onto the shared channel) because tonic clients take `&mut self`.

use async_trait::async_trait;
use tonic::{Request, Status};

use super::client::proto::{
    CreateDatasetRequest, CreateDatasetResponse, CreateDownloadLinkRequest,
    CreateDownloadLinkResponse, CreateObjectGroupRequest, CreateObjectGroupResponse,
    CreateProjectRequest, CreateProjectResponse, CreateUploadLinkRequest, CreateUploadLinkResponse,
    GetDatasetObjectGroupsRequest, GetDatasetObjectGroupsResponse, GetDatasetRequest,
    GetDatasetResponse, GetDatasetVersionObjectGroupsRequest,
    GetDatasetVersionObjectGroupsResponse, GetDatasetVersionRequest, GetDatasetVersionResponse,
    GetDatasetVersionsRequest, GetDatasetVersionsResponse, GetObjectGroupRequest,
    GetObjectGroupResponse, GetObjectGroupRevisionRequest, GetObjectGroupRevisionResponse,
    GetObjectGroupRevisionsRequest, GetObjectGroupRevisionsResponse, GetProjectDatasetsRequest,
    GetProjectDatasetsResponse, GetProjectRequest, GetProjectResponse, GetUserProjectsRequest,
    GetUserProjectsResponse, ReleaseDatasetVersionRequest, ReleaseDatasetVersionResponse,
    UpdateObjectGroupRequest, UpdateObjectGroupResponse,
};
use super::client::ClientBundle;

/// Result of a single remote call
pub type RpcResult<T> = std::result::Result<T, Status>;

/// The storage service operations used by this client
#[async_trait]
pub trait StorageApi: Send + Sync {
    // ProjectService
    async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> RpcResult<CreateProjectResponse>;

    async fn get_project(&self, request: GetProjectRequest) -> RpcResult<GetProjectResponse>;

    async fn get_user_projects(
        &self,
        request: GetUserProjectsRequest,
    ) -> RpcResult<GetUserProjectsResponse>;

    async fn get_project_datasets(
        &self,
        request: GetProjectDatasetsRequest,
    ) -> RpcResult<GetProjectDatasetsResponse>;

    // DatasetService
    async fn create_dataset(
        &self,
        request: CreateDatasetRequest,
    ) -> RpcResult<CreateDatasetResponse>;

    async fn get_dataset(&self, request: GetDatasetRequest) -> RpcResult<GetDatasetResponse>;

    async fn get_dataset_object_groups(
        &self,
        request: GetDatasetObjectGroupsRequest,
    ) -> RpcResult<GetDatasetObjectGroupsResponse>;

    async fn release_dataset_version(
        &self,
        request: ReleaseDatasetVersionRequest,
    ) -> RpcResult<ReleaseDatasetVersionResponse>;

    async fn get_dataset_version(
        &self,
        request: GetDatasetVersionRequest,
    ) -> RpcResult<GetDatasetVersionResponse>;

    async fn get_dataset_versions(
        &self,
        request: GetDatasetVersionsRequest,
    ) -> RpcResult<GetDatasetVersionsResponse>;

    async fn get_dataset_version_object_groups(
        &self,
        request: GetDatasetVersionObjectGroupsRequest,
    ) -> RpcResult<GetDatasetVersionObjectGroupsResponse>;

    // DatasetObjectsService
    async fn create_object_group(
        &self,
        request: CreateObjectGroupRequest,
    ) -> RpcResult<CreateObjectGroupResponse>;

    async fn get_object_group(
        &self,
        request: GetObjectGroupRequest,
    ) -> RpcResult<GetObjectGroupResponse>;

    async fn get_object_group_revisions(
        &self,
        request: GetObjectGroupRevisionsRequest,
    ) -> RpcResult<GetObjectGroupRevisionsResponse>;

    async fn get_object_group_revision(
        &self,
        request: GetObjectGroupRevisionRequest,
    ) -> RpcResult<GetObjectGroupRevisionResponse>;

    async fn update_object_group(
        &self,
        request: UpdateObjectGroupRequest,
    ) -> RpcResult<UpdateObjectGroupResponse>;

    // ObjectLoadService
    async fn create_upload_link(
        &self,
        request: CreateUploadLinkRequest,
    ) -> RpcResult<CreateUploadLinkResponse>;

    async fn create_download_link(
        &self,
        request: CreateDownloadLinkRequest,
    ) -> RpcResult<CreateDownloadLinkResponse>;
}

#[async_trait]
impl StorageApi for ClientBundle {
    async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> RpcResult<CreateProjectResponse> {
        let response = self
            .project_service()
            .create_project(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_project(&self, request: GetProjectRequest) -> RpcResult<GetProjectResponse> {
        let response = self
            .project_service()
            .get_project(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_user_projects(
        &self,
        request: GetUserProjectsRequest,
    ) -> RpcResult<GetUserProjectsResponse> {
        let response = self
            .project_service()
            .get_user_projects(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_project_datasets(
        &self,
        request: GetProjectDatasetsRequest,
    ) -> RpcResult<GetProjectDatasetsResponse> {
        let response = self
            .project_service()
            .get_project_datasets(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn create_dataset(
        &self,
        request: CreateDatasetRequest,
    ) -> RpcResult<CreateDatasetResponse> {
        let response = self
            .dataset_service()
            .create_dataset(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_dataset(&self, request: GetDatasetRequest) -> RpcResult<GetDatasetResponse> {
        let response = self
            .dataset_service()
            .get_dataset(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_dataset_object_groups(
        &self,
        request: GetDatasetObjectGroupsRequest,
    ) -> RpcResult<GetDatasetObjectGroupsResponse> {
        let response = self
            .dataset_service()
            .get_dataset_object_groups(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn release_dataset_version(
        &self,
        request: ReleaseDatasetVersionRequest,
    ) -> RpcResult<ReleaseDatasetVersionResponse> {
        let response = self
            .dataset_service()
            .release_dataset_version(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_dataset_version(
        &self,
        request: GetDatasetVersionRequest,
    ) -> RpcResult<GetDatasetVersionResponse> {
        let response = self
            .dataset_service()
            .get_dataset_version(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_dataset_versions(
        &self,
        request: GetDatasetVersionsRequest,
    ) -> RpcResult<GetDatasetVersionsResponse> {
        let response = self
            .dataset_service()
            .get_dataset_versions(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_dataset_version_object_groups(
        &self,
        request: GetDatasetVersionObjectGroupsRequest,
    ) -> RpcResult<GetDatasetVersionObjectGroupsResponse> {
        let response = self
            .dataset_service()
            .get_dataset_version_object_groups(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn create_object_group(
        &self,
        request: CreateObjectGroupRequest,
    ) -> RpcResult<CreateObjectGroupResponse> {
        let response = self
            .object_group_service()
            .create_object_group(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_object_group(
        &self,
        request: GetObjectGroupRequest,
    ) -> RpcResult<GetObjectGroupResponse> {
        let response = self
            .object_group_service()
            .get_object_group(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_object_group_revisions(
        &self,
        request: GetObjectGroupRevisionsRequest,
    ) -> RpcResult<GetObjectGroupRevisionsResponse> {
        let response = self
            .object_group_service()
            .get_object_group_revisions(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn get_object_group_revision(
        &self,
        request: GetObjectGroupRevisionRequest,
    ) -> RpcResult<GetObjectGroupRevisionResponse> {
        let response = self
            .object_group_service()
            .get_object_group_revision(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn update_object_group(
        &self,
        request: UpdateObjectGroupRequest,
    ) -> RpcResult<UpdateObjectGroupResponse> {
        let response = self
            .object_group_service()
            .update_object_group(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn create_upload_link(
        &self,
        request: CreateUploadLinkRequest,
    ) -> RpcResult<CreateUploadLinkResponse> {
        let response = self
            .object_load_service()
            .create_upload_link(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn create_download_link(
        &self,
        request: CreateDownloadLinkRequest,
    ) -> RpcResult<CreateDownloadLinkResponse> {
        let response = self
            .object_load_service()
            .create_download_link(Request::new(request))
            .await?;
        Ok(response.into_inner())
    }
}
