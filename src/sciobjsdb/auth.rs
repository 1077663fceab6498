//! Per-call authentication metadata
//!
//! The credential kind is resolved from configuration on every outgoing call,
//! never cached, so a token swapped on the bundle is picked up by the next call.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::service::Interceptor;
use tonic::{Request, Status};

use super::error::{Result, SciObjsDbError};
use crate::config::AuthConfig;

/// Metadata key carrying an OAuth-style access token
pub const ACCESS_TOKEN_KEY: &str = "AccessToken";

/// Metadata key carrying a static API token
pub const API_TOKEN_KEY: &str = "API_TOKEN";

/// Kind of token presented to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    AccessToken,
    ApiToken,
}

impl TokenKind {
    /// Metadata key the service expects for this kind of token
    pub fn metadata_key(self) -> &'static str {
        match self {
            TokenKind::AccessToken => ACCESS_TOKEN_KEY,
            TokenKind::ApiToken => API_TOKEN_KEY,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata_key())
    }
}

/// A token together with the kind it is presented as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub kind: TokenKind,
    pub token: String,
}

/// Resolve the token the bundle should carry.
///
/// A configured access token wins over a configured API token, which wins over
/// the token handed in by the caller.
pub fn resolve_token(auth: &AuthConfig, token_arg: Option<String>) -> String {
    auth.access_token()
        .or_else(|| auth.user_token())
        .map(str::to_string)
        .or(token_arg)
        .unwrap_or_default()
}

/// Derives the authentication metadata attached to every outgoing call
#[derive(Debug)]
pub struct AuthContextProvider {
    auth: AuthConfig,
    token: RwLock<String>,
}

impl AuthContextProvider {
    pub fn new(auth: AuthConfig, token: String) -> Self {
        AuthContextProvider {
            auth,
            token: RwLock::new(token),
        }
    }

    /// Replace the token used from the next call on
    pub fn set_token(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// The active credential, if any token kind is configured.
    ///
    /// Without a configured kind the call goes out unauthenticated, even when
    /// the bundle carries a token.
    pub fn credential(&self) -> Option<Credential> {
        let kind = if self.auth.access_token().is_some() {
            TokenKind::AccessToken
        } else if self.auth.user_token().is_some() {
            TokenKind::ApiToken
        } else {
            return None;
        };

        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Some(Credential { kind, token })
    }

    /// Build the metadata entry for the current credential
    pub fn metadata(&self) -> Result<Option<(AsciiMetadataKey, AsciiMetadataValue)>> {
        let Some(credential) = self.credential() else {
            return Ok(None);
        };

        // from_bytes lowercases the key, as gRPC requires on the wire
        let key = AsciiMetadataKey::from_bytes(credential.kind.metadata_key().as_bytes())
            .map_err(|e| SciObjsDbError::Auth(format!("Invalid metadata key: {}", e)))?;
        let value = credential.token.parse().map_err(|e| {
            SciObjsDbError::Auth(format!("Invalid {} token format: {}", credential.kind, e))
        })?;

        Ok(Some((key, value)))
    }

    /// Attach the current credential to a request
    pub fn authorize<T>(&self, mut request: Request<T>) -> std::result::Result<Request<T>, Status> {
        match self.metadata() {
            Ok(Some((key, value))) => {
                request.metadata_mut().insert(key, value);
                Ok(request)
            }
            Ok(None) => Ok(request),
            Err(e) => {
                tracing::error!("{}", e);
                Err(Status::unauthenticated(e.to_string()))
            }
        }
    }
}

/// Interceptor that asks the provider for fresh metadata on each call
#[derive(Debug, Clone)]
pub struct AuthInterceptor {
    provider: Arc<AuthContextProvider>,
}

impl AuthInterceptor {
    pub fn new(provider: Arc<AuthContextProvider>) -> Self {
        AuthInterceptor { provider }
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, request: Request<()>) -> std::result::Result<Request<()>, Status> {
        self.provider.authorize(request)
    }
}
