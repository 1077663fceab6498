use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use reqwest::StatusCode;

use super::ResourceKind;
use crate::download::DownloadOutcome;
use crate::sciobjsdb::proto::{
    Dataset, DatasetVersion, EntityStatus, Label, ObjectGroup, ObjectGroupRevision, Project,
    Version,
};
use crate::upload::TransferOutcome;

const STATUS_PREFIX: &str = "ENTITY_STATUS_";

/// One result entity, rendered as a single line
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Project(Project),
    Dataset(Dataset),
    DatasetVersion(DatasetVersion),
    ObjectGroup(ObjectGroup),
    ObjectGroupRevision(ObjectGroupRevision),
    /// Receipt for a create call
    Created { resource: ResourceKind, id: String },
    /// Receipt for a finished transfer, whatever the target answered
    Uploaded {
        object_id: String,
        content_length: u64,
        status: StatusCode,
    },
    /// Receipt for an object group update
    Updated {
        object_group_id: String,
        revision_id: String,
        revision: i64,
    },
    /// Receipt for a downloaded object
    Downloaded {
        object_id: String,
        path: PathBuf,
        bytes: u64,
    },
}

impl From<TransferOutcome> for Record {
    fn from(outcome: TransferOutcome) -> Self {
        Record::Uploaded {
            object_id: outcome.object_id,
            content_length: outcome.content_length,
            status: outcome.status,
        }
    }
}

impl From<DownloadOutcome> for Record {
    fn from(outcome: DownloadOutcome) -> Self {
        Record::Downloaded {
            object_id: outcome.object_id,
            path: outcome.path,
            bytes: outcome.bytes,
        }
    }
}

struct Labels<'a>(&'a [Label]);

impl fmt::Display for Labels<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", label.key, label.value)?;
        }
        f.write_str("]")
    }
}

struct VersionTag<'a>(Option<&'a Version>);

impl fmt::Display for VersionTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self.0.cloned().unwrap_or_default();
        write!(f, "v{}.{}.{}", version.major, version.minor, version.patch)
    }
}

fn status_name(status: i32) -> &'static str {
    EntityStatus::try_from(status)
        .map(|status| {
            let name = status.as_str_name();
            name.strip_prefix(STATUS_PREFIX).unwrap_or(name)
        })
        .unwrap_or("UNKNOWN")
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Project(project) => write!(
                f,
                "{} - {} - {} - {}",
                project.name,
                project.id,
                project.description,
                Labels(&project.labels)
            ),
            Record::Dataset(dataset) => write!(
                f,
                "{} - {} - {} - {}",
                dataset.name,
                dataset.id,
                status_name(dataset.status),
                Labels(&dataset.labels)
            ),
            Record::DatasetVersion(version) => write!(
                f,
                "{} - {} - {} - {} - {} object group revision(s)",
                version.name,
                version.id,
                VersionTag(version.version.as_ref()),
                status_name(version.status),
                version.object_group_revision_ids.len()
            ),
            Record::ObjectGroup(group) => write!(
                f,
                "{} - {} - {} - {}",
                group.name,
                group.id,
                status_name(group.status),
                Labels(&group.labels)
            ),
            Record::ObjectGroupRevision(revision) => write!(
                f,
                "revision {} - {} - {} object(s) - {}",
                revision.revision,
                revision.id,
                revision.objects.len(),
                status_name(revision.status)
            ),
            Record::Created { resource, id } => write!(f, "created {} {}", resource, id),
            Record::Uploaded {
                object_id,
                content_length,
                status,
            } => write!(
                f,
                "uploaded {} bytes to {} ({})",
                content_length, object_id, status
            ),
            Record::Updated {
                object_group_id,
                revision_id,
                revision,
            } => write!(
                f,
                "updated OBJECT_GROUP {} to revision {} ({})",
                object_group_id, revision, revision_id
            ),
            Record::Downloaded {
                object_id,
                path,
                bytes,
            } => write!(
                f,
                "downloaded {} bytes of {} to {}",
                bytes,
                object_id,
                path.display()
            ),
        }
    }
}

/// Write records one per line, in the order given
pub fn print_records(
    records: impl IntoIterator<Item = Record>,
    mut writer: impl Write,
) -> io::Result<()> {
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    writer.flush()
}
