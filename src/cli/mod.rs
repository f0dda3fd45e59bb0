//! CLI argument parsing for the corral demo binary.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};

/// Corral: cooperative document-level locking over a shared record store.
///
/// The demo binary runs the lock/mutate/release protocol against a seeded
/// in-memory store, either as a single caller or as racing workers.
#[derive(Parser, Debug)]
#[command(name = "corral")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug-level logging.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the protocol once as a single caller.
    ///
    /// Seeds the store, locks the target set, applies the demo payload
    /// mutation, releases, and prints the final record state.
    Run(RunArgs),

    /// Race several workers over the same target set.
    ///
    /// Spawns worker threads that each run the full protocol against one
    /// shared store, demonstrating mutual exclusion and retry liveness
    /// under contention.
    Contend(ContendArgs),
}

/// Retry/backoff options shared by both commands.
#[derive(Args, Debug)]
pub struct RetryArgs {
    /// Backoff interval between attempts in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub backoff_ms: u64,

    /// Use jittered exponential backoff instead of a fixed interval.
    #[arg(long)]
    pub exponential: bool,

    /// Cap on a single exponential backoff delay in milliseconds.
    #[arg(long, default_value_t = 8000)]
    pub max_backoff_ms: u64,

    /// Abort after this many attempts (unbounded when omitted).
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Abort after this many milliseconds of wall-clock time.
    #[arg(long)]
    pub deadline_ms: Option<u64>,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Record keys to lock and mutate as one unit.
    #[arg(long, value_delimiter = ',', default_value = "1,3,5")]
    pub keys: Vec<u64>,

    /// Number of records to seed the store with (keys 1..=N).
    #[arg(long, default_value_t = 5)]
    pub seed: u64,

    /// Print the final record state as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub retry: RetryArgs,
}

/// Arguments for the `contend` command.
#[derive(Args, Debug)]
pub struct ContendArgs {
    /// Record keys every worker races for.
    #[arg(long, value_delimiter = ',', default_value = "1,3,5")]
    pub keys: Vec<u64>,

    /// Number of records to seed the store with (keys 1..=N).
    #[arg(long, default_value_t = 5)]
    pub seed: u64,

    /// Number of racing workers.
    #[arg(long, default_value_t = 4)]
    pub workers: u32,

    /// Print the final record state as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub retry: RetryArgs,
}
