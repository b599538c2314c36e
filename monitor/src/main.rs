mod channel;
mod dispatcher;
mod display;
mod poller;
mod query;
mod scheduler;
mod servers;

use channel::ResultChannel;
use clap::Parser;
use dispatcher::Dispatcher;
use display::ConsolePresenter;
use log::info;
use poller::BatchPoller;
use scheduler::{CycleScheduler, PollState};
use servers::ServerList;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server list file, one host:port per line
    #[arg(short = 's', long, default_value = "servers.txt")]
    servers: String,

    /// Refresh interval in seconds
    #[arg(short = 'i', long, default_value = "30")]
    interval: u64,

    /// Per-server query timeout in seconds
    #[arg(short = 't', long, default_value = "3")]
    timeout: u64,

    /// Consumer tick in milliseconds
    #[arg(long, default_value = "250")]
    tick: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting server monitor...");
    info!("Server list: {}", args.servers);
    info!("Refresh interval: {}s", args.interval);

    let servers = ServerList::load_or_seed(&args.servers)?;
    let state = PollState::new(args.interval);
    let channel = ResultChannel::new();

    let scheduler = CycleScheduler::new(
        servers,
        state,
        BatchPoller::new(Duration::from_secs(args.timeout)),
        channel.clone(),
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    let dispatcher = Dispatcher::new(
        channel,
        ConsolePresenter::new(),
        Duration::from_millis(args.tick),
    );

    tokio::select! {
        _ = dispatcher.run() => {}
        result = scheduler_handle => {
            if let Err(e) = result {
                eprintln!("Polling task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
