//! Content process: serves item content read from a file at startup.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use bazaar_core::protocol::hosts;
use bazaar_core::ContentTable;
use bazaar_market::ContentService;
use bazaar_node::{args, bootstrap, logging, CommonArgs, Fatal};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "content", about = "Item content service")]
struct Args {
    /// Port to listen on
    #[arg(value_parser = args::port)]
    port: u16,

    /// File of `<itemId> <content>` lines
    content_file: PathBuf,

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
    let table = bootstrap::load_table(&args.content_file, |path| ContentTable::load(path))?;
    info!(items = table.len(), "content loaded");

    let service = Arc::new(ContentService::new(table));
    bootstrap::register_and_serve(
        hosts::CONTENT,
        args.port,
        args.nameserver_port,
        &config,
        service,
    )
    .await
}
