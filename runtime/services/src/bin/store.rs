//! Store process: lists stock and coordinates purchases with the bank and
//! the content service.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use bazaar_core::protocol::hosts;
use bazaar_core::StockTable;
use bazaar_fabric::server;
use bazaar_market::Coordinator;
use bazaar_node::{args, bootstrap, logging, CommonArgs, Fatal};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "store", about = "Storefront and purchase coordinator")]
struct Args {
    /// Port to listen on
    #[arg(value_parser = args::port)]
    port: u16,

    /// File of `<itemId> <price>` lines
    stock_file: PathBuf,

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
    let stock = bootstrap::load_table(&args.stock_file, |path| StockTable::load(path))?;
    info!(items = stock.len(), "stock loaded");

    let channel = bootstrap::bind(args.port).await?;
    let directory = bootstrap::directory(args.nameserver_port, &config)?;
    bootstrap::register(&directory, hosts::STORE, args.port, &config).await?;

    let content = bootstrap::resolve(&directory, hosts::CONTENT).await?;
    let bank = bootstrap::resolve(&directory, hosts::BANK).await?;

    let coordinator = Coordinator::new(
        stock,
        bank,
        content,
        bootstrap::exchange(&config.service_exchange)?,
    );
    server::serve(channel, Arc::new(coordinator)).await;
    Ok(())
}
