//! ScienceObjectsDB gRPC client module
//!
//! Structure:
//! - `client.rs`: connection factory, generated protobuf code and the stub bundle
//! - `auth.rs`: per-call authentication metadata
//! - `api.rs`: the `StorageApi` seam over the remote operations
//! - `error.rs`: error types

pub mod api;
pub mod auth;
pub mod client;
pub mod error;

// Re-exports for convenience
pub use api::StorageApi;
pub use auth::{AuthContextProvider, Credential, TokenKind};
pub use client::{proto, ClientBundle, TransportSecurity};
pub use error::{Result, SciObjsDbError};
