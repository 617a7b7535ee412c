// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct Prefix4 {
    pub value: Ipv4Addr,
    pub length: u8,
}

impl PartialOrd for Prefix4 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Prefix4 {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.value != other.value {
            return self.value.cmp(&other.value);
        }
        self.length.cmp(&other.length)
    }
}

impl Prefix4 {
    /// Create a new `Prefix4` from an IP address and prefix length.
    /// The newly created `Prefix4` will have its host bits zeroed upon
    /// creation e.g.
    /// ```
    /// use rib::Prefix4;
    /// use std::net::Ipv4Addr;
    /// let p4 = Prefix4::new(Ipv4Addr::new(10, 0, 0, 10), 24);
    /// assert_eq!(p4.value, Ipv4Addr::new(10, 0, 0, 0));
    /// ```
    pub fn new(ip: Ipv4Addr, length: u8) -> Self {
        let mut new = Self { value: ip, length };
        new.unset_host_bits();
        new
    }

    /// Create a `Prefix4` from a network address and a dotted-quad netmask
    /// as they appear on the wire. The mask must be contiguous, a run of
    /// one bits followed by a run of zero bits.
    pub fn from_parts(
        network: Ipv4Addr,
        netmask: Ipv4Addr,
    ) -> Result<Self, Error> {
        Ok(Self::new(network, mask_length(netmask)?))
    }

    fn mask_bits(&self) -> u32 {
        match self.length {
            0 => 0,
            n => (!0u32) << (32 - u32::from(n)),
        }
    }

    /// The dotted-quad netmask corresponding to this prefix length.
    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.mask_bits())
    }

    pub fn host_bits_are_unset(&self) -> bool {
        self.value.to_bits() & self.mask_bits() == self.value.to_bits()
    }

    pub fn unset_host_bits(&mut self) {
        self.value = Ipv4Addr::from_bits(self.value.to_bits() & self.mask_bits())
    }

    /// Check if an address falls within this prefix. A zero-length prefix
    /// contains every address and a full-length prefix contains only the
    /// network address itself.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        addr.to_bits() & self.mask_bits()
            == self.value.to_bits() & self.mask_bits()
    }

    /// The prefix covering this one with the mask shortened by one bit.
    /// The freed host bit is cleared. Zero-length prefixes cannot shorten
    /// further and are returned unchanged.
    pub fn shorten(&self) -> Self {
        match self.length {
            0 => *self,
            n => Self::new(self.value, n - 1),
        }
    }
}

impl fmt::Display for Prefix4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.length)
    }
}

impl FromStr for Prefix4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, length) = s
            .split_once('/')
            .ok_or_else(|| Error::MalformedPrefix(s.to_string()))?;

        let value: Ipv4Addr = value
            .parse()
            .map_err(|_| Error::MalformedPrefix(s.to_string()))?;
        let length: u8 = length
            .parse()
            .map_err(|_| Error::MalformedPrefix(s.to_string()))?;
        if length > 32 {
            return Err(Error::InvalidPrefixLength(length));
        }
        Ok(Self::new(value, length))
    }
}

/// Derive a prefix length from a dotted-quad netmask. Masks whose set bits
/// are not a single left-aligned run are rejected as malformed.
pub fn mask_length(netmask: Ipv4Addr) -> Result<u8, Error> {
    let bits = netmask.to_bits();
    let length = bits.leading_ones();
    let expected = match length {
        0 => 0,
        n => (!0u32) << (32 - n),
    };
    if bits != expected {
        return Err(Error::InvalidMask(netmask));
    }
    Ok(length as u8)
}

/// How a route entered the routing system.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum PathOrigin {
    /// Learned from an interior gateway protocol. Preferred over all
    /// other origins.
    #[serde(rename = "IGP")]
    Igp,

    /// Learned from an exterior gateway protocol.
    #[serde(rename = "EGP")]
    Egp,

    /// Origin unknown. Least preferred.
    #[serde(rename = "UNK")]
    Unk,
}

impl fmt::Display for PathOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Igp => write!(f, "IGP"),
            Self::Egp => write!(f, "EGP"),
            Self::Unk => write!(f, "UNK"),
        }
    }
}

/// A route table entry. Associates a prefix with the neighbor it was
/// learned from and the path attributes used by best-path selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: Prefix4,

    /// The neighbor this route was learned from. Also the next hop, since
    /// neighbors are directly attached.
    pub peer: Ipv4Addr,

    /// Operator assigned preference. Higher wins.
    pub local_pref: u32,

    /// True when the advertising router originated the route itself.
    pub self_origin: bool,

    /// AS numbers the route traversed, nearest first.
    pub as_path: Vec<u32>,

    pub origin: PathOrigin,
}

impl Route {
    /// Compare every attribute except the prefix. Two entries with equal
    /// attributes are candidates for coalescing.
    pub fn attrs_eq(&self, other: &Self) -> bool {
        self.peer == other.peer
            && self.local_pref == other.local_pref
            && self.self_origin == other.self_origin
            && self.as_path == other.as_path
            && self.origin == other.origin
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.prefix, self.peer)
    }
}
