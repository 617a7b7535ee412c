// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::Ipv4Addr;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("non-contiguous netmask {0}")]
    InvalidMask(Ipv4Addr),

    #[error("prefix length {0} out of range")]
    InvalidPrefixLength(u8),

    #[error("malformed prefix {0}")]
    MalformedPrefix(String),
}
