// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Peering policy.
//!
//! Each neighbor link carries one of three commercial relationships.
//! Traffic and announcements may transit between two neighbors only when
//! at least one side of the pair is a customer. Peer-to-peer,
//! peer-to-provider, and provider-to-provider transit is refused.
//!
//! The same rule governs both decisions the router makes: whether a data
//! packet may be forwarded from its ingress neighbor to the selected
//! egress, and whether an announcement learned from one neighbor is
//! readvertised to another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Customer,
    Peer,
    Provider,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "cust"),
            Self::Peer => write!(f, "peer"),
            Self::Provider => write!(f, "prov"),
        }
    }
}

impl FromStr for Relation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cust" => Ok(Self::Customer),
            "peer" => Ok(Self::Peer),
            "prov" => Ok(Self::Provider),
            _ => Err(Error::InvalidNeighborSpec(s.to_string())),
        }
    }
}

/// May traffic or an announcement that arrived over the `ingress`
/// relationship leave over the `egress` relationship?
pub fn transit_permitted(ingress: Relation, egress: Relation) -> bool {
    ingress == Relation::Customer || egress == Relation::Customer
}
