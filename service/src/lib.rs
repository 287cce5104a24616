//! Library entry for the waitlist service.
//!
//! Exposes `inner_main` so the workspace-level shim binary can call into the
//! service logic: serving the signup API, listing entries, or running a demo.
#![cfg_attr(
    test,
    expect(clippy::indexing_slicing, reason = "This is not problematic in tests",)
)]

extern crate alloc;
extern crate core;

pub mod cli;
pub mod db;
pub mod demo;
pub mod email;
pub mod http;
pub mod list;
pub mod run;
pub mod submission;

use std::{io, sync::Once};

use eyre::{Result, WrapErr as _};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use cli::{Cli, Command, LogFormat};

static INIT_TRACING: Once = Once::new();

/// Install the global tracing subscriber once. Logs go to stderr so that
/// `list` output on stdout stays clean.
fn init_tracing(format: LogFormat) {
    INIT_TRACING.call_once(move || {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_timer(ChronoLocal::rfc_3339())
            .with_writer(io::stderr);

        match format {
            LogFormat::Compact => builder.compact().init(),
            LogFormat::Json => builder.json().init(),
            LogFormat::Pretty => builder.pretty().init(),
        }
    });
}

/// The service's main function; called from the shim binary.
///
/// Dispatches to `serve`, `list` or `demo`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or initialized, the
/// server fails to start, or listing fails.
pub async fn inner_main(invocation: Cli) -> Result<()> {
    init_tracing(invocation.log_format);

    match invocation.command {
        Command::Serve(args) => run::start(&args.database.path, &args.listen)
            .await
            .wrap_err("server error"),
        Command::List(args) => list::run(
            &args.database.path,
            &mut io::stdout(),
            args.honeypot.into(),
        )
        .await
        .wrap_err("list failed"),
        Command::Demo(args) => {
            let path = demo::create_database(&args.dir).wrap_err("demo setup failed")?;
            info!("demo database created at {}", path.display());
            run::start(&path, &args.listen)
                .await
                .wrap_err("demo server error")
        }
    }
}
