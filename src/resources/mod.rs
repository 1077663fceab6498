//! Resource identifiers and the dispatch of create / list / describe onto them
//!
//! - `dispatcher.rs`: maps a resource plus an action onto the typed remote call
//! - `request_file.rs`: request files decoded for the create calls
//! - `records.rs`: rendered result records

use std::fmt;
use std::str::FromStr;

use crate::sciobjsdb::SciObjsDbError;

pub mod dispatcher;
pub mod records;
pub mod request_file;

pub use dispatcher::ResourceDispatcher;
pub use records::{print_records, Record};

/// Suffix carried by the service's resource enum names, accepted on input
const LEGACY_SUFFIX: &str = "_RESOURCE";

/// Addressable remote entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    Dataset,
    DatasetVersion,
    ObjectGroup,
    ObjectGroupVersion,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Project,
        ResourceKind::Dataset,
        ResourceKind::DatasetVersion,
        ResourceKind::ObjectGroup,
        ResourceKind::ObjectGroupVersion,
    ];

    /// Canonical name as accepted on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Project => "PROJECT",
            ResourceKind::Dataset => "DATASET",
            ResourceKind::DatasetVersion => "DATASET_VERSION",
            ResourceKind::ObjectGroup => "OBJECT_GROUP",
            ResourceKind::ObjectGroupVersion => "OBJECT_GROUP_VERSION",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = SciObjsDbError;

    /// Parse a resource name.
    ///
    /// Case-insensitive; `-` and `_` are interchangeable and the `_RESOURCE`
    /// suffix is optional. Anything else is an error, there is no fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        let name = normalized
            .strip_suffix(LEGACY_SUFFIX)
            .unwrap_or(&normalized);

        match name.replace('_', "").as_str() {
            "PROJECT" => Ok(ResourceKind::Project),
            "DATASET" => Ok(ResourceKind::Dataset),
            "DATASETVERSION" => Ok(ResourceKind::DatasetVersion),
            "OBJECTGROUP" => Ok(ResourceKind::ObjectGroup),
            "OBJECTGROUPVERSION" => Ok(ResourceKind::ObjectGroupVersion),
            _ => Err(SciObjsDbError::UnknownResource(s.to_string())),
        }
    }
}

/// Change applied to an object group, producing a new revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum UpdateOperation {
    Add,
    Delete,
}
