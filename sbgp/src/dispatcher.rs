// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::connection::{Event, NeighborChannel};
use crate::router::Router;
use slog::{error, info, Logger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on one wait for neighbor input, so shutdown requests are
/// noticed promptly even on an idle network.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The event loop. Drains the queue fed by the per-neighbor readers and
/// drives the router, one message to completion per iteration. Frames
/// from a single neighbor arrive in order through its reader; arrival
/// order across neighbors is whatever the queue yields.
///
/// The loop ends when any neighbor channel closes or when the shutdown
/// flag is raised.
pub struct Dispatcher<Cnx: NeighborChannel> {
    router: Router<Cnx>,
    event_rx: Receiver<Event>,
    shutdown: Arc<AtomicBool>,
    log: Logger,
}

impl<Cnx: NeighborChannel> Dispatcher<Cnx> {
    pub fn new(
        router: Router<Cnx>,
        event_rx: Receiver<Event>,
        log: Logger,
    ) -> Self {
        Self {
            router,
            event_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
            log,
        }
    }

    /// A handle that stops the loop at its next iteration when set.
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn router(&self) -> &Router<Cnx> {
        &self.router
    }

    pub fn run(&mut self) {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            match self.event_rx.recv_timeout(POLL_INTERVAL) {
                Ok(Event::Frame { peer, frame }) => {
                    if let Err(e) = self.router.handle_frame(peer, &frame) {
                        error!(self.log, "fatal dispatch error: {e}");
                        break;
                    }
                }
                Ok(Event::Closed { peer }) => {
                    info!(self.log, "[{peer}] channel closed, stopping");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    info!(self.log, "all channel readers gone, stopping");
                    break;
                }
            }
        }
    }
}
