//! x13-wheels - X-13ARIMA-SEATS binaries as Python wheels
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Downloads the Census Bureau's pre-built X-13ARIMA-SEATS archives and
//! repackages each one as a platform wheel of the `x13binary` distribution.
//! The same binary can locate an installed executable the way the Python
//! shim does, which makes install layouts easy to debug.

pub mod cmd;
pub mod reporter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use x13_schema::{DEFAULT_BASE_URL, DEFAULT_RELEASE, Platform};

#[derive(Debug, Parser)]
#[command(name = "x13-wheels")]
#[command(author, version, about = "Build and locate x13binary wheels")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download upstream archives and write one wheel per platform
    Build {
        /// Upstream release, e.g. v1-1-b61
        #[arg(long, env = "X13_RELEASE", default_value = DEFAULT_RELEASE)]
        release: String,
        /// Root of the upstream archive tree
        #[arg(long, env = "X13_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,
        /// Directory receiving the wheels
        #[arg(long, env = "X13_OUTDIR", default_value = "dist")]
        outdir: PathBuf,
        /// Project holding LICENSE, README.pypi.md and src/x13binary
        #[arg(long, env = "X13_PROJECT_ROOT", default_value = ".")]
        project_root: PathBuf,
        /// Platform to build (repeatable; all when omitted)
        #[arg(long = "platform")]
        platforms: Vec<Platform>,
    },
    /// Print the path of the installed x13as_html executable
    Locate,
    /// Run the installed x13as_html executable
    Run {
        /// Arguments passed through to x13as_html
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Compute SHA256 hash of a file
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
