//! CLI argument parsing using clap 4.x derive macros

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hardened data processing and cloud relay service
///
/// Demonstrates the service's externally-visible operations: local user
/// lookups, calls to the processing API, encrypted cloud uploads, SMTP
/// notifications and authenticated webhook relaying.
#[derive(Parser, Debug)]
#[command(name = "datarelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the configuration file (defaults to datarelay.toml lookup)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the demonstration sequence (fetch + API call)
    Demo,

    /// Fetch a user record by id
    Fetch {
        /// User id to look up
        #[arg(long)]
        id: i64,
    },

    /// Upload a file to cloud storage with encryption at rest
    Upload {
        /// Local file to upload
        file: PathBuf,

        /// Bucket override (defaults to the configured bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Send a notification email
    Notify {
        /// Recipient address
        recipient: String,

        /// Message subject
        #[arg(short, long, default_value = "datarelay notification")]
        subject: String,

        /// Message body
        #[arg(short, long)]
        body: String,
    },

    /// Process a webhook payload from a file and relay it
    Webhook {
        /// File holding the JSON payload
        file: PathBuf,

        /// Hex HMAC-SHA256 signature of the payload
        #[arg(short, long)]
        signature: Option<String>,

        /// Sign the payload locally with the configured secret
        #[arg(long, conflicts_with = "signature")]
        sign: bool,
    },

    /// Print the cloud architecture advisory
    Advisory {
        /// Print a single section (agents, workflow, mapping,
        /// reusability, practical)
        #[arg(short, long)]
        section: Option<String>,
    },
}
