// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A simplified inter-AS routing protocol.
//!
//! Neighbors exchange JSON-framed `update`, `revoke`, `data`, and `dump`
//! messages over named datagram channels. This crate provides the wire
//! types, the peering policy, the channel abstraction, and the router
//! core with its dispatcher loop. The route table itself lives in the
//! `rib` crate.

pub mod config;
pub mod connection;
pub mod connection_unix;
pub mod dispatcher;
pub mod error;
pub mod log;
pub mod messages;
pub mod policy;
pub mod router;

#[cfg(test)]
#[macro_use]
extern crate lazy_static;


#[cfg(test)]
pub mod connection_channel;
