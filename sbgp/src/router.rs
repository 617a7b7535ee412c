// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The router core.
//!
//! A [`Router`] owns every piece of mutable routing state: the neighbor
//! set fixed at startup, the append-only announcement history, and the
//! route table derived from it. The dispatcher is the only caller, so
//! one message is always processed to completion before the next and no
//! locking is needed.
//!
//! The route table is kept equal to the result of replaying the full
//! history and coalescing. Updates maintain that incrementally; revokes
//! rebuild from scratch, because a withdrawal may name a fragment of a
//! previously coalesced prefix and replay disaggregates it without any
//! inverse-merge bookkeeping.

use crate::config::RouterConfig;
use crate::connection::{Event, NeighborChannel};
use crate::error::Error;
use crate::messages::{
    Envelope, Payload, TableEntry, UpdateBody, Withdrawal,
};
use crate::policy::{transit_permitted, Relation};
use rib::{bestpath, RouteTable};
use serde_json::json;
use slog::{debug, error, Logger};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::mpsc::Sender;

/// The router's own address on a neighbor link: the neighbor address
/// with the final octet replaced by 1.
pub fn gateway(peer: Ipv4Addr) -> Ipv4Addr {
    let octets = peer.octets();
    Ipv4Addr::new(octets[0], octets[1], octets[2], 1)
}

struct Neighbor<Cnx: NeighborChannel> {
    kind: Relation,
    channel: Cnx,
}

enum AnnouncementKind {
    Update(UpdateBody),
    Revoke(Vec<Withdrawal>),
}

/// An announcement as received, tagged with its arrival neighbor.
/// History is append-only for the lifetime of the process.
struct Announcement {
    peer: Ipv4Addr,
    kind: AnnouncementKind,
}

pub struct Router<Cnx: NeighborChannel> {
    pub config: RouterConfig,
    neighbors: BTreeMap<Ipv4Addr, Neighbor<Cnx>>,
    table: RouteTable,
    history: Vec<Announcement>,
    log: Logger,
}

impl<Cnx: NeighborChannel> Router<Cnx> {
    pub fn new(config: RouterConfig, log: Logger) -> Self {
        Self {
            config,
            neighbors: BTreeMap::new(),
            table: RouteTable::new(),
            history: Vec::new(),
            log,
        }
    }

    pub fn add_neighbor(
        &mut self,
        addr: Ipv4Addr,
        kind: Relation,
        channel: Cnx,
    ) {
        self.neighbors.insert(addr, Neighbor { kind, channel });
    }

    /// Start a reader thread per neighbor channel, all feeding the given
    /// dispatcher queue.
    pub fn spawn_readers(&self, event_tx: Sender<Event>) {
        for (addr, nbr) in &self.neighbors {
            nbr.channel.spawn_reader(*addr, event_tx.clone());
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Process one inbound frame. Malformed frames and frames with an
    /// unrecognized type are dropped here; the only error returned is a
    /// frame from an address outside the neighbor set, which cannot
    /// happen through a correctly tagged reader and is fatal.
    pub fn handle_frame(
        &mut self,
        peer: Ipv4Addr,
        frame: &[u8],
    ) -> Result<(), Error> {
        let ingress = self
            .neighbors
            .get(&peer)
            .ok_or(Error::UnknownNeighbor(peer))?
            .kind;

        let envelope: Envelope = match serde_json::from_slice(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(self.log, "[{peer}] dropping frame: {e}");
                return Ok(());
            }
        };

        match &envelope.payload {
            Payload::Update(body) => {
                self.handle_update(peer, ingress, body.clone())
            }
            Payload::Revoke(withdrawals) => {
                self.handle_revoke(peer, ingress, withdrawals.clone())
            }
            Payload::Data(_) => {
                self.handle_data(peer, ingress, &envelope, frame)
            }
            Payload::Dump(_) => self.handle_dump(peer, &envelope),
            Payload::Table(_) | Payload::NoRoute(_) => {
                debug!(
                    self.log,
                    "[{peer}] ignoring {} message",
                    envelope.payload.kind()
                );
            }
        }
        Ok(())
    }

    fn handle_update(
        &mut self,
        peer: Ipv4Addr,
        ingress: Relation,
        body: UpdateBody,
    ) {
        let route = match body.to_route(peer, self.config.asn) {
            Ok(route) => route,
            Err(e) => {
                error!(self.log, "[{peer}] rejecting update: {e}");
                return;
            }
        };
        debug!(self.log, "[{peer}] update {route}");

        self.history.push(Announcement {
            peer,
            kind: AnnouncementKind::Update(body.clone()),
        });
        self.table.insert(route);
        self.table.coalesce();

        let advertised = Payload::Update(body.augmented(self.config.asn));
        self.fanout(peer, ingress, &advertised);
    }

    fn handle_revoke(
        &mut self,
        peer: Ipv4Addr,
        ingress: Relation,
        withdrawals: Vec<Withdrawal>,
    ) {
        for w in &withdrawals {
            if let Err(e) = w.to_prefix() {
                error!(self.log, "[{peer}] rejecting revoke: {e}");
                return;
            }
        }
        debug!(
            self.log,
            "[{peer}] revoke of {} prefixes",
            withdrawals.len()
        );

        self.history.push(Announcement {
            peer,
            kind: AnnouncementKind::Revoke(withdrawals.clone()),
        });
        self.table = self.replay_table();

        self.fanout(peer, ingress, &Payload::Revoke(withdrawals));
    }

    /// Rebuild a route table from the announcement history: every update
    /// inserted in arrival order, every revoke removing its exact
    /// (network, netmask, sender) triples, then coalesced. The live
    /// table always equals this.
    pub fn replay_table(&self) -> RouteTable {
        let mut table = RouteTable::new();
        for announcement in &self.history {
            match &announcement.kind {
                AnnouncementKind::Update(body) => {
                    // Announcements rejected on arrival never reach
                    // history, so the conversions here cannot fail.
                    if let Ok(route) =
                        body.to_route(announcement.peer, self.config.asn)
                    {
                        table.insert(route);
                    }
                }
                AnnouncementKind::Revoke(withdrawals) => {
                    for w in withdrawals {
                        if let Ok(prefix) = w.to_prefix() {
                            table.remove_matching(prefix, announcement.peer);
                        }
                    }
                }
            }
        }
        table.coalesce();
        table
    }

    fn handle_data(
        &self,
        peer: Ipv4Addr,
        ingress: Relation,
        envelope: &Envelope,
        frame: &[u8],
    ) {
        if let Some(best) = bestpath(self.table.lookup(envelope.dst)) {
            if let Some(egress) = self.neighbors.get(&best.peer) {
                if transit_permitted(ingress, egress.kind) {
                    debug!(
                        self.log,
                        "[{peer}] data for {} via {}", envelope.dst, best.peer
                    );
                    if let Err(e) = egress.channel.send(frame) {
                        error!(
                            self.log,
                            "[{}] data send failed: {e}", best.peer
                        );
                    }
                    return;
                }
            }
        }

        debug!(self.log, "[{peer}] no route to {}", envelope.dst);
        let reply = Envelope {
            src: gateway(peer),
            dst: envelope.src,
            payload: Payload::NoRoute(json!({})),
        };
        if let Err(e) = self.send_envelope(peer, &reply) {
            error!(self.log, "[{peer}] no route reply failed: {e}");
        }
    }

    fn handle_dump(&self, peer: Ipv4Addr, request: &Envelope) {
        let entries: Vec<TableEntry> =
            self.table.iter().map(TableEntry::from).collect();
        let reply = Envelope {
            src: request.dst,
            dst: request.src,
            payload: Payload::Table(entries),
        };
        if let Err(e) = self.send_envelope(peer, &reply) {
            error!(self.log, "[{peer}] table reply failed: {e}");
        }
    }

    /// Readvertise an announcement to every neighbor the peering policy
    /// allows, excluding the neighbor it came from.
    fn fanout(&self, origin: Ipv4Addr, ingress: Relation, payload: &Payload) {
        for (addr, nbr) in &self.neighbors {
            if *addr == origin || !transit_permitted(ingress, nbr.kind) {
                continue;
            }
            let envelope = Envelope {
                src: gateway(*addr),
                dst: *addr,
                payload: payload.clone(),
            };
            if let Err(e) = self.send_envelope(*addr, &envelope) {
                error!(self.log, "[{addr}] advertisement failed: {e}");
            }
        }
    }

    fn send_envelope(
        &self,
        egress: Ipv4Addr,
        envelope: &Envelope,
    ) -> Result<(), Error> {
        let nbr = self
            .neighbors
            .get(&egress)
            .ok_or(Error::UnknownNeighbor(egress))?;
        let frame = serde_json::to_vec(envelope)?;
        nbr.channel.send(&frame)
    }
}
