//! Command line surface
//!
//! Each subcommand owns an argument struct that is handed to its handler;
//! handlers write rendered records to the writer they are given.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use crate::config::Config;
use crate::download::{DownloadTransfer, PathStyle};
use crate::resources::{print_records, Record, ResourceDispatcher, ResourceKind, UpdateOperation};
use crate::sciobjsdb::error::{Result, SciObjsDbError};
use crate::sciobjsdb::ClientBundle;
use crate::upload::UploadTransfer;

/// Command line client for the ScienceObjectsDB storage service
#[derive(Debug, Parser)]
#[command(about, version, subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    /// Path to the config file. Defaults to <config dir>/sciobjsdb/config.yaml
    /// or ~/.sciobjsdb/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Service host, overrides the config file
    #[arg(long, global = true, env = "SCIOBJSDB_HOST")]
    pub host: Option<String>,

    /// Service port, overrides the config file
    #[arg(long, global = true, env = "SCIOBJSDB_PORT")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creates the given resource type from a request file
    Create(CreateArgs),
    /// Lists the subresources of the given resource
    Ls(LsArgs),
    /// Displays details of the given resource
    Describe(DescribeArgs),
    /// Uploads a local file as the data of an existing object
    Upload(UploadArgs),
    /// Downloads every object below the given resource
    Load(LoadArgs),
    /// Adds objects to or removes objects from an object group
    Update(UpdateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Resource type to create (PROJECT, DATASET, DATASET_VERSION, OBJECT_GROUP)
    #[arg(short, long)]
    pub resource: String,
    /// Request file, JSON (.json) or YAML
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,
    /// Token used when the config carries none
    #[arg(short, long)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct LsArgs {
    /// Resource type to list
    #[arg(short, long)]
    pub resource: String,
    /// Parent id (project for DATASET, dataset for DATASET_VERSION and
    /// OBJECT_GROUP, object group for OBJECT_GROUP_VERSION); unused for PROJECT
    #[arg(short, long)]
    pub id: Option<String>,
    /// With DATASET_VERSION, list the object groups of version <ID> instead
    #[arg(long)]
    pub object_groups: bool,
    /// Token used when the config carries none
    #[arg(short, long)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct DescribeArgs {
    /// Resource type to describe
    #[arg(short, long)]
    pub resource: String,
    /// Id of the resource
    #[arg(short, long)]
    pub id: String,
    /// Token used when the config carries none
    #[arg(short, long)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct UploadArgs {
    /// Local file to upload
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,
    /// Id of the object receiving the data
    #[arg(short, long)]
    pub id: String,
    /// Token used when the config carries none
    #[arg(short, long)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// Resource type to download (PROJECT, DATASET, OBJECT_GROUP)
    #[arg(short, long)]
    pub resource: String,
    /// Id of the resource
    #[arg(short, long)]
    pub id: String,
    /// Local directory receiving the objects
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,
    /// Layout of the downloaded files
    #[arg(short, long, value_enum, default_value_t = PathStyle::Canonical)]
    pub style: PathStyle,
    /// Token used when the config carries none
    #[arg(short, long)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    /// Whether the listed objects are added or removed
    #[arg(short, long, value_enum)]
    pub operation: UpdateOperation,
    /// Request file naming the object group and the objects, JSON (.json) or YAML
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,
    /// Token used when the config carries none
    #[arg(short, long)]
    pub token: Option<String>,
}

fn parse_resource(resource: &str) -> Result<ResourceKind> {
    resource.parse::<ResourceKind>().inspect_err(|e| error!("{}", e))
}

fn write_output(result: std::io::Result<()>) -> Result<()> {
    result.map_err(|source| {
        error!("Could not write output: {}", source);
        SciObjsDbError::Output(source)
    })
}

pub async fn run_create(args: &CreateArgs, config: &Config, out: impl Write) -> Result<()> {
    let resource = parse_resource(&args.resource)?;
    let bundle = ClientBundle::connect(config, args.token.clone()).await?;
    let transfer = UploadTransfer::new(config.endpoint.timeout())?;

    let records = ResourceDispatcher::new(&bundle, &transfer)
        .create(resource, &args.file)
        .await?;

    write_output(print_records(records, out))
}

pub async fn run_ls(args: &LsArgs, config: &Config, out: impl Write) -> Result<()> {
    let resource = parse_resource(&args.resource)?;
    if args.object_groups && resource != ResourceKind::DatasetVersion {
        let err = SciObjsDbError::UnsupportedResource {
            resource,
            action: "list object groups",
        };
        error!("{}", err);
        return Err(err);
    }
    let bundle = ClientBundle::connect(config, args.token.clone()).await?;
    let transfer = UploadTransfer::new(config.endpoint.timeout())?;

    let dispatcher = ResourceDispatcher::new(&bundle, &transfer);
    let records = match resource {
        ResourceKind::DatasetVersion if args.object_groups => {
            dispatcher
                .list_version_object_groups(args.id.as_deref())
                .await?
        }
        _ => dispatcher.list(resource, args.id.as_deref()).await?,
    };

    write_output(print_records(records, out))
}

pub async fn run_describe(args: &DescribeArgs, config: &Config, out: impl Write) -> Result<()> {
    let resource = parse_resource(&args.resource)?;
    let bundle = ClientBundle::connect(config, args.token.clone()).await?;
    let transfer = UploadTransfer::new(config.endpoint.timeout())?;

    let record = ResourceDispatcher::new(&bundle, &transfer)
        .describe(resource, Some(&args.id))
        .await?;

    write_output(print_records([record], out))
}

pub async fn run_upload(args: &UploadArgs, config: &Config, out: impl Write) -> Result<()> {
    let bundle = ClientBundle::connect(config, args.token.clone()).await?;
    let transfer = UploadTransfer::new(config.endpoint.timeout())?;

    let outcome = transfer.upload(&bundle, &args.file, &args.id).await?;
    info!("Upload of '{}' finished", args.file.display());

    write_output(print_records([Record::from(outcome)], out))
}

pub async fn run_load(args: &LoadArgs, config: &Config, out: impl Write) -> Result<()> {
    let resource = parse_resource(&args.resource)?;
    let bundle = ClientBundle::connect(config, args.token.clone()).await?;
    let transfer = UploadTransfer::new(config.endpoint.timeout())?;
    let downloads = DownloadTransfer::new(config.endpoint.timeout())?;

    let records = ResourceDispatcher::new(&bundle, &transfer)
        .load(&downloads, resource, Some(&args.id), &args.path, args.style)
        .await?;
    info!(
        "Loaded {} object(s) into '{}'",
        records.len(),
        args.path.display()
    );

    write_output(print_records(records, out))
}

pub async fn run_update(args: &UpdateArgs, config: &Config, out: impl Write) -> Result<()> {
    let bundle = ClientBundle::connect(config, args.token.clone()).await?;
    let transfer = UploadTransfer::new(config.endpoint.timeout())?;

    let record = ResourceDispatcher::new(&bundle, &transfer)
        .update(args.operation, &args.file)
        .await?;

    write_output(print_records([record], out))
}

impl Command {
    /// Run the subcommand against `config`, writing results to `out`
    pub async fn run(&self, config: &Config, out: impl Write) -> Result<()> {
        match self {
            Command::Create(args) => run_create(args, config, out).await,
            Command::Ls(args) => run_ls(args, config, out).await,
            Command::Describe(args) => run_describe(args, config, out).await,
            Command::Upload(args) => run_upload(args, config, out).await,
            Command::Load(args) => run_load(args, config, out).await,
            Command::Update(args) => run_update(args, config, out).await,
        }
    }
}
