//! Command-line interface definitions for the waitlist service.
//!
//! This module contains the CLI argument parsing structures and enums
//! used by the `waitlist` binary.

use std::{env, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Storage location used when neither `--file` nor `DATABASE_PATH` is given.
pub const DEFAULT_DATABASE_PATH: &str = "waitlist.db";

/// Top-level command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = "waitlist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the waitlist HTTP API server.
    Serve(ServeArgs),

    /// Print waitlist entries (use --honeypot for trap submissions).
    List(ListArgs),

    /// Launch the server against a fresh, uniquely named SQLite database.
    Demo(DemoArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
    Pretty,
}

/// Where to find the SQLite database.
#[derive(Debug, Args)]
pub struct DatabaseArgs {
    /// Path to the SQLite database file
    #[arg(
        short = 'f',
        long = "file",
        env = "DATABASE_PATH",
        default_value = DEFAULT_DATABASE_PATH
    )]
    pub path: PathBuf,
}

/// Listener settings shared by `serve` and `demo`.
#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Signup form served at `/`
    #[arg(long, default_value = "index.html")]
    pub index: PathBuf,
}

/// Arguments for the `serve` command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub listen: ListenArgs,
}

/// Arguments for the `list` command.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// List only honeypot trap submissions
    #[arg(long)]
    pub honeypot: bool,
}

/// Arguments for the `demo` command.
#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Directory where the demo SQLite database will be created
    #[arg(short = 'd', long, default_value = ".")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub listen: ListenArgs,
}
