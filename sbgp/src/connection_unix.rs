// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The production neighbor channel: a SOCK_SEQPACKET unix socket
//! connected to the filesystem path named after the neighbor. Seqpacket
//! preserves record boundaries, so one read is one message and a
//! zero-length read means the peer is gone.

use crate::connection::{Event, NeighborChannel};
use crate::error::Error;
use crate::messages::MAX_MESSAGE_SIZE;
use slog::{debug, error, Logger};
use socket2::{Domain, SockAddr, Socket, Type};
use std::io::{Read, Write};
use std::net::Ipv4Addr;
use std::os::unix::io::OwnedFd;
use std::os::unix::net::UnixStream;
use std::sync::mpsc::Sender;
use std::thread::spawn;

pub struct UnixChannel {
    stream: UnixStream,
    log: Logger,
}

impl NeighborChannel for UnixChannel {
    fn connect(name: &str, log: Logger) -> Result<Self, Error> {
        let socket = Socket::new(Domain::UNIX, Type::SEQPACKET, None)?;
        socket.connect(&SockAddr::unix(name)?)?;
        Ok(Self {
            stream: UnixStream::from(OwnedFd::from(socket)),
            log,
        })
    }

    fn send(&self, frame: &[u8]) -> Result<(), Error> {
        (&self.stream).write_all(frame)?;
        Ok(())
    }

    fn spawn_reader(&self, peer: Ipv4Addr, event_tx: Sender<Event>) {
        let mut stream = match self.stream.try_clone() {
            Ok(s) => s,
            Err(e) => {
                error!(self.log, "[{peer}] clone for reader failed: {e}");
                let _ = event_tx.send(Event::Closed { peer });
                return;
            }
        };
        let log = self.log.clone();
        spawn(move || {
            let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) => {
                        debug!(log, "[{peer}] channel closed");
                        let _ = event_tx.send(Event::Closed { peer });
                        break;
                    }
                    Ok(n) => {
                        let frame = buf[..n].to_vec();
                        if event_tx.send(Event::Frame { peer, frame }).is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(log, "[{peer}] recv failed: {e}");
                        let _ = event_tx.send(Event::Closed { peer });
                        break;
                    }
                }
            }
        });
    }
}
