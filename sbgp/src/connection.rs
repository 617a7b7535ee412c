// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use slog::Logger;
use std::net::Ipv4Addr;
use std::sync::mpsc::Sender;

/// Events delivered from neighbor channel readers to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One received frame, tagged with the neighbor it arrived from.
    Frame { peer: Ipv4Addr, frame: Vec<u8> },

    /// The neighbor's channel shut down or failed.
    Closed { peer: Ipv4Addr },
}

/// A duplex channel to one neighbor, addressed by name. The name is the
/// neighbor's dotted-quad address; what it resolves to is up to the
/// implementation, an OS socket in production and an in-memory queue
/// pair under test.
///
/// Receiving is push-based: `spawn_reader` starts a thread that turns
/// each inbound frame into an [`Event`] on the shared dispatcher queue,
/// ending with [`Event::Closed`] when the channel dies. Sends are
/// best-effort and never retried.
pub trait NeighborChannel: Send + Sized + 'static {
    fn connect(name: &str, log: Logger) -> Result<Self, Error>;

    fn send(&self, frame: &[u8]) -> Result<(), Error>;

    fn spawn_reader(&self, peer: Ipv4Addr, event_tx: Sender<Event>);
}
