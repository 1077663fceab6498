//! ScienceObjectsDB command line client library
//!
//! - `sciobjsdb`: connection factory, auth metadata and the remote API seam
//! - `resources`: resource names and the create / list / describe / update / load dispatch
//! - `upload`: two-phase object upload through signed links
//! - `download`: two-phase object download and the local path layouts
//! - `config`: client configuration
//! - `cli`: argument structs and command handlers

pub mod cli;
pub mod config;
pub mod download;
pub mod resources;
pub mod sciobjsdb;
pub mod upload;
