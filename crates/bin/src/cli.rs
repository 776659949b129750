//! CLI argument definitions for the Accord binary.

use std::path::PathBuf;

use accord::{ActorId, ObjId};
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Inspect, edit, merge and sync Accord document files
#[derive(Parser, Debug)]
#[command(name = "accord")]
#[command(about = "Accord: conflict-free replicated documents on local disk")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human", env = "ACCORD_FORMAT")]
    pub format: OutputFormat,

    /// Actor id (hex) to write as. A random actor is used when unset.
    /// Commands that only combine existing files (`merge`, `sync`) ignore it.
    #[arg(long, global = true, env = "ACCORD_ACTOR")]
    pub actor: Option<ActorId>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty document file
    Init(InitArgs),
    /// Put a JSON value at a root key and commit
    Put(PutArgs),
    /// Print a document, or one object in it, as JSON
    Show(ShowArgs),
    /// Summarize actors, heads and history
    Info(FileArgs),
    /// List every change in the document
    History(FileArgs),
    /// Merge one document file into another
    Merge(MergeArgs),
    /// Run the sync protocol between two document files
    Sync(SyncArgs),
}

/// Arguments for the init command
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Path of the new document
    pub file: PathBuf,

    /// Replace the file if it already exists
    #[arg(long)]
    pub force: bool,
}

/// Arguments for commands that read a single document
#[derive(clap::Args, Debug)]
pub struct FileArgs {
    /// Document file
    pub file: PathBuf,
}

/// Arguments for the put command
#[derive(clap::Args, Debug)]
pub struct PutArgs {
    /// Document file
    pub file: PathBuf,

    /// Root key to write
    pub key: String,

    /// JSON value; objects and arrays become nested maps and lists
    pub json: String,

    /// Commit message
    #[arg(short, long)]
    pub message: Option<String>,
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Document file
    pub file: PathBuf,

    /// Object to print instead of the root
    #[arg(long = "obj")]
    pub obj: Option<ObjId>,
}

/// Arguments for the merge command
#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Document to merge into
    pub target: PathBuf,

    /// Document to merge from
    pub source: PathBuf,

    /// Write the result here instead of over the target
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the sync command
#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// First document
    pub a: PathBuf,

    /// Second document
    pub b: PathBuf,

    /// Give up after this many rounds
    #[arg(long, default_value_t = accord::constants::MAX_SYNC_ROUNDS)]
    pub max_rounds: usize,
}
