use std::sync::Arc;

use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, error, warn};

use super::auth::{resolve_token, AuthContextProvider, AuthInterceptor};
use super::error::{Result, SciObjsDbError};
use crate::config::Config;

// Include the generated protobuf code
#[allow(
    dead_code,
    unused_imports,
    clippy::large_enum_variant,
    clippy::enum_variant_names
)]
pub mod proto {
    tonic::include_proto!("sciobjsdb.storage.v1");
}

use proto::dataset_objects_service_client::DatasetObjectsServiceClient;
use proto::dataset_service_client::DatasetServiceClient;
use proto::object_load_service_client::ObjectLoadServiceClient;
use proto::project_service_client::ProjectServiceClient;

/// Host for which the channel is opened without TLS
pub const INSECURE_HOST: &str = "127.0.0.1";

type AuthChannel = InterceptedService<Channel, AuthInterceptor>;

/// Type alias for authenticated ProjectService client
pub type AuthProjectServiceClient = ProjectServiceClient<AuthChannel>;

/// Type alias for authenticated DatasetService client
pub type AuthDatasetServiceClient = DatasetServiceClient<AuthChannel>;

/// Type alias for authenticated DatasetObjectsService client
pub type AuthObjectGroupServiceClient = DatasetObjectsServiceClient<AuthChannel>;

/// Type alias for authenticated ObjectLoadService client
pub type AuthObjectLoadServiceClient = ObjectLoadServiceClient<AuthChannel>;

/// Transport security of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    Insecure,
    Tls,
}

impl TransportSecurity {
    /// Plaintext for the loopback development host, TLS for everything else.
    ///
    /// This is a development convenience, not a security decision.
    pub fn for_host(host: &str) -> Self {
        if host == INSECURE_HOST {
            TransportSecurity::Insecure
        } else {
            TransportSecurity::Tls
        }
    }

    fn scheme(self) -> &'static str {
        match self {
            TransportSecurity::Insecure => "http",
            TransportSecurity::Tls => "https",
        }
    }
}

/// Build the channel endpoint for the configured host and port
pub fn endpoint(config: &Config) -> Result<Endpoint> {
    let host = config.endpoint.host.as_str();
    let port = config.endpoint.port;

    if host.is_empty() || port == 0 {
        let err = SciObjsDbError::Config(format!(
            "Endpoint host and port must be set (got '{}:{}')",
            host, port
        ));
        error!("{}", err);
        return Err(err);
    }

    let security = TransportSecurity::for_host(host);
    let uri = format!("{}://{}:{}", security.scheme(), host, port);

    let mut endpoint = Channel::from_shared(uri.clone()).map_err(|e| {
        let err = SciObjsDbError::Config(format!("Invalid endpoint '{}': {}", uri, e));
        error!("{}", err);
        err
    })?;

    if security == TransportSecurity::Tls {
        let tls = ClientTlsConfig::new()
            .with_webpki_roots()
            .domain_name(host.to_string());
        endpoint = endpoint.tls_config(tls).map_err(|e| {
            let err =
                SciObjsDbError::Config(format!("Failed to configure TLS for '{}': {}", uri, e));
            error!("{}", err);
            err
        })?;
    }

    if let Some(timeout) = config.endpoint.timeout() {
        endpoint = endpoint.connect_timeout(timeout).timeout(timeout);
    }

    Ok(endpoint)
}

/// One channel plus a stub per remote service
///
/// Every stub shares the same channel and the same auth provider; the token is
/// the only thing that may change after construction.
#[derive(Debug, Clone)]
pub struct ClientBundle {
    auth: Arc<AuthContextProvider>,
    project_service: AuthProjectServiceClient,
    dataset_service: AuthDatasetServiceClient,
    object_group_service: AuthObjectGroupServiceClient,
    object_load_service: AuthObjectLoadServiceClient,
}

impl ClientBundle {
    /// Connect to the configured endpoint and build the service stubs.
    ///
    /// `token` is used only when the configuration carries no token of its own.
    pub async fn connect(config: &Config, token: Option<String>) -> Result<Self> {
        let endpoint = endpoint(config)?;
        let target = endpoint.uri().to_string();

        debug!(
            "Connecting to {} ({:?})",
            target,
            TransportSecurity::for_host(&config.endpoint.host)
        );

        let channel = endpoint.connect().await.map_err(|source| {
            error!("Failed to connect to '{}': {}", target, source);
            SciObjsDbError::Connection {
                endpoint: target.clone(),
                source,
            }
        })?;

        Ok(Self::from_channel(channel, config, token))
    }

    /// Build the stubs over an already established channel
    pub fn from_channel(channel: Channel, config: &Config, token: Option<String>) -> Self {
        if token.is_some()
            && config.auth.access_token().is_none()
            && config.auth.user_token().is_none()
        {
            warn!("A token was given but no token kind is configured; calls are unauthenticated");
        }

        let token = resolve_token(&config.auth, token);
        let auth = Arc::new(AuthContextProvider::new(config.auth.clone(), token));
        let interceptor = AuthInterceptor::new(auth.clone());

        ClientBundle {
            auth,
            project_service: ProjectServiceClient::with_interceptor(
                channel.clone(),
                interceptor.clone(),
            ),
            dataset_service: DatasetServiceClient::with_interceptor(
                channel.clone(),
                interceptor.clone(),
            ),
            object_group_service: DatasetObjectsServiceClient::with_interceptor(
                channel.clone(),
                interceptor.clone(),
            ),
            object_load_service: ObjectLoadServiceClient::with_interceptor(channel, interceptor),
        }
    }

    /// Swap the token presented from the next call on
    pub fn set_token(&self, token: impl Into<String>) {
        self.auth.set_token(token.into());
    }

    /// Get a ProjectService client with authentication
    pub fn project_service(&self) -> AuthProjectServiceClient {
        self.project_service.clone()
    }

    /// Get a DatasetService client with authentication
    pub fn dataset_service(&self) -> AuthDatasetServiceClient {
        self.dataset_service.clone()
    }

    /// Get a DatasetObjectsService client with authentication
    pub fn object_group_service(&self) -> AuthObjectGroupServiceClient {
        self.object_group_service.clone()
    }

    /// Get an ObjectLoadService client with authentication
    pub fn object_load_service(&self) -> AuthObjectLoadServiceClient {
        self.object_load_service.clone()
    }
}
