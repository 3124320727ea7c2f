//! Directory process: maps hostnames to ip/port pairs for every other process.

use std::process::ExitCode;
use std::sync::Arc;

use bazaar_directory::DirectoryService;
use bazaar_fabric::server;
use bazaar_node::{args, bootstrap, logging, CommonArgs, Fatal};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "nameserver", about = "Hostname registration and lookup service")]
struct Args {
    /// Port to listen on
    #[arg(value_parser = args::port)]
    port: u16,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match args::parse::<Args>() {
        Ok(args) => args,
        Err(code) => return code,
    };
    logging::init(args.common.verbose);

    bazaar_node::finish(run(args).await)
}

async fn run(args: Args) -> Result<(), Fatal> {
    // The directory never starts an exchange, but a bad config still fails startup
    args.common.node_config()?;

    let channel = bootstrap::bind(args.port).await?;
    server::serve(channel, Arc::new(DirectoryService::default())).await;
    Ok(())
}
