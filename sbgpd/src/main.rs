// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Context;
use clap::Parser;
use sbgp::config::{NeighborConfig, RouterConfig};
use sbgp::connection::NeighborChannel;
use sbgp::connection_unix::UnixChannel;
use sbgp::dispatcher::Dispatcher;
use sbgp::router::Router;
use slog::{info, Drain, Logger};
use std::sync::mpsc;

/// A simplified inter-AS routing daemon.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Autonomous system number for this router
    asn: u32,

    /// Neighbors as <ipv4>-<relation>, relation one of cust, peer, prov.
    /// The address is also the filesystem name of the neighbor's channel.
    #[arg(required = true)]
    neighbors: Vec<NeighborConfig>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log = init_logger();

    let (event_tx, event_rx) = mpsc::channel();
    let mut router =
        Router::<UnixChannel>::new(RouterConfig { asn: cli.asn }, log.clone());

    for nbr in &cli.neighbors {
        let channel = UnixChannel::connect(&nbr.addr.to_string(), log.clone())
            .with_context(|| format!("connect to neighbor {nbr}"))?;
        router.add_neighbor(nbr.addr, nbr.kind, channel);
    }
    router.spawn_readers(event_tx);

    info!(log, "router up";
        "asn" => cli.asn,
        "neighbors" => cli.neighbors.len()
    );

    Dispatcher::new(router, event_rx, log).run();
    Ok(())
}

fn init_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::new(drain).fuse();
    let drain = slog_async::Async::new(drain)
        .chan_size(0x2000)
        .build()
        .fuse();
    slog::Logger::root(drain, slog::o!())
}
