// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! This file contains code for testing purposes only. It implements
//! NeighborChannel over in-memory queue pairs so the router can be
//! exercised against simulated neighbors without OS sockets. A test
//! binds a name on the simulated network to play the neighbor, then the
//! router connects to that name through the normal code path.

use crate::connection::{Event, NeighborChannel};
use crate::error::Error;
use slog::{error, Logger};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::thread::spawn;

lazy_static! {
    static ref NET: Network = Network::new();
}

/// A simulated network mapping endpoint names to the channels of
/// whoever bound them.
pub struct Network {
    endpoints: Mutex<HashMap<String, Sender<Endpoint<Vec<u8>>>>>,
}

impl Network {
    fn new() -> Self {
        Self {
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    fn bind(&self, name: &str) -> Listener {
        let (tx, rx) = mpsc::channel();
        self.endpoints
            .lock()
            .unwrap()
            .insert(name.to_string(), tx);
        Listener { rx }
    }

    fn connect(&self, name: &str) -> Result<Endpoint<Vec<u8>>, Error> {
        match self.endpoints.lock().unwrap().get(name) {
            None => Err(Error::ChannelConnect),
            Some(sender) => {
                let (local, remote) = channel();
                sender
                    .send(remote)
                    .map_err(|e| Error::ChannelSend(e.to_string()))?;
                Ok(local)
            }
        }
    }
}

/// Bind `name` on the simulated network. The returned listener yields
/// the test-harness side of each connection made to that name.
pub fn bind(name: &str) -> Listener {
    NET.bind(name)
}

pub struct Listener {
    rx: Receiver<Endpoint<Vec<u8>>>,
}

impl Listener {
    pub fn accept(&self) -> Result<Endpoint<Vec<u8>>, Error> {
        self.rx.recv().map_err(|_| Error::Disconnected)
    }
}

/// A NeighborChannel over the simulated network.
pub struct ChannelConnection {
    tx: Sender<Vec<u8>>,
    rx: Arc<Mutex<Option<Receiver<Vec<u8>>>>>,
    log: Logger,
}

impl NeighborChannel for ChannelConnection {
    fn connect(name: &str, log: Logger) -> Result<Self, Error> {
        let endpoint = NET.connect(name)?;
        Ok(Self {
            tx: endpoint.tx,
            rx: Arc::new(Mutex::new(Some(endpoint.rx))),
            log,
        })
    }

    fn send(&self, frame: &[u8]) -> Result<(), Error> {
        self.tx
            .send(frame.to_vec())
            .map_err(|e| Error::ChannelSend(e.to_string()))
    }

    fn spawn_reader(&self, peer: Ipv4Addr, event_tx: Sender<Event>) {
        let rx = match self.rx.lock().unwrap().take() {
            Some(rx) => rx,
            None => {
                error!(self.log, "[{peer}] reader already spawned");
                return;
            }
        };
        spawn(move || loop {
            match rx.recv() {
                Ok(frame) => {
                    if event_tx.send(Event::Frame { peer, frame }).is_err() {
                        break;
                    }
                }
                Err(_) => {
                    let _ = event_tx.send(Event::Closed { peer });
                    break;
                }
            }
        });
    }
}

// BIDI

use std::sync::mpsc::{self, Receiver, Sender};

/// A combined (duplex) mpsc sender/receiver.
pub struct Endpoint<T> {
    pub rx: Receiver<T>,
    pub tx: Sender<T>,
}

impl<T> Endpoint<T> {
    fn new(rx: Receiver<T>, tx: Sender<T>) -> Self {
        Self { rx, tx }
    }
}

/// Analagous to std::sync::mpsc::channel for bidirectional endpoints.
pub fn channel<T>() -> (Endpoint<T>, Endpoint<T>) {
    let (tx_a, rx_b) = mpsc::channel();
    let (tx_b, rx_a) = mpsc::channel();
    (Endpoint::new(rx_a, tx_a), Endpoint::new(rx_b, tx_b))
}
