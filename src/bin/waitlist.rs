//! Shim binary that calls into the `waitlist_service` library's `inner_main`.
use clap::Parser as _;
use eyre::Result;
use waitlist_service::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Delegate to library entrypoint
    waitlist_service::inner_main(Cli::parse()).await
}
