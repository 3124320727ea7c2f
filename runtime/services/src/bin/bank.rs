//! Authorization process: approves payments for even item ids.

use std::process::ExitCode;
use std::sync::Arc;

use bazaar_core::protocol::hosts;
use bazaar_market::{AuthorizationService, EvenItems};
use bazaar_node::{args, bootstrap, logging, CommonArgs, Fatal};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bank", about = "Payment authorization service")]
struct Args {
    /// Port to listen on
    #[arg(value_parser = args::port)]
    port: u16,

    /// Port of the nameserver on this host
    #[arg(value_parser = args::port)]
    nameserver_port: u16,

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
    let config = args.common.node_config()?;
    let service = Arc::new(AuthorizationService::new(EvenItems));

    bootstrap::register_and_serve(hosts::BANK, args.port, args.nameserver_port, &config, service)
        .await
}
