// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use crate::policy::Relation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    /// Autonomous system number of this router.
    pub asn: u32,
}

/// One neighbor as given on the command line: `<ipv4>-<relation>` with
/// relation one of `cust`, `peer`, `prov`. The address doubles as the
/// name of the neighbor's channel endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborConfig {
    pub addr: Ipv4Addr,
    pub kind: Relation,
}

impl fmt::Display for NeighborConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.addr, self.kind)
    }
}

impl FromStr for NeighborConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, kind) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidNeighborSpec(s.to_string()))?;
        Ok(Self {
            addr: addr
                .parse()
                .map_err(|_| Error::InvalidNeighborSpec(s.to_string()))?,
            kind: kind.parse()?,
        })
    }
}
