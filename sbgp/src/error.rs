// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::Ipv4Addr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("channel connect error")]
    ChannelConnect,

    #[error("channel send {0}")]
    ChannelSend(String),

    #[error("disconnected")]
    Disconnected,

    #[error("message from unknown neighbor {0}")]
    UnknownNeighbor(Ipv4Addr),

    #[error("invalid neighbor spec {0:?}, expected <ipv4>-<cust|peer|prov>")]
    InvalidNeighborSpec(String),

    #[error("route table error {0}")]
    Rib(#[from] rib::error::Error),
}
