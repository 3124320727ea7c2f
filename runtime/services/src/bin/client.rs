//! Buyer process: prints the store listing, or buys one listed item.

use std::process::ExitCode;

use bazaar_core::protocol::hosts;
use bazaar_market::{shopper, StoreClient};
use bazaar_node::{args, bootstrap, logging, CommonArgs, Fatal};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "client", about = "List or buy items from the store")]
struct Args {
    /// 0 to print the listing, n to buy the n-th listed item
    request: usize,

    /// Port of the nameserver on this host
    #[arg(value_parser = args::port)]
    nameserver_port: u16,

    /// Payment token sent with purchases
    #[arg(long, default_value = "1234567812345678")]
    payment_token: String,

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
    let directory = bootstrap::directory(args.nameserver_port, &config)?;
    let store = bootstrap::resolve(&directory, hosts::STORE).await?;

    let client = StoreClient::new(
        store.socket_addr(),
        bootstrap::exchange(&config.client_exchange)?,
    );

    if args.request == 0 {
        let listing = client.list().await?;
        println!("{}", shopper::numbered(&listing));
    } else {
        let receipt = client.buy_listed(&args.payment_token, args.request).await?;
        println!("{}", receipt);
    }
    Ok(())
}
