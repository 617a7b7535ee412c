// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire message types.
//!
//! Every frame on a neighbor channel is one JSON object:
//!
//! ```text
//! { "src": <ipv4>, "dst": <ipv4>, "type": <string>, "msg": <value> }
//! ```
//!
//! The field spellings here are pinned to the wire and must not change:
//! `localpref`, `selfOrigin`, `ASPath`, and the `"no route"` type tag
//! with its embedded space.

use crate::error::Error;
use rib::{PathOrigin, Prefix4, Route};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One frame is one datagram; the transport never carries more than this
/// many bytes per message.
pub const MAX_MESSAGE_SIZE: usize = 65_535;

/// The envelope common to every message. `src` and `dst` are dotted-quad
/// addresses; for announcements they name the link endpoints, for data
/// packets the original source and final destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    #[serde(flatten)]
    pub payload: Payload,
}

/// The six message kinds, discriminated by the `type` field with the
/// body under `msg`. Frames with any other `type` fail to parse and are
/// dropped by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "msg")]
pub enum Payload {
    /// A route announcement from a neighbor.
    #[serde(rename = "update")]
    Update(UpdateBody),

    /// Withdrawal of previously announced prefixes.
    #[serde(rename = "revoke")]
    Revoke(Vec<Withdrawal>),

    /// A payload-bearing packet to be forwarded toward `dst`. The body
    /// is opaque and carried through unchanged.
    #[serde(rename = "data")]
    Data(serde_json::Value),

    /// Request for the current route table. The body is ignored.
    #[serde(rename = "dump")]
    Dump(serde_json::Value),

    /// Reply to a dump request.
    #[serde(rename = "table")]
    Table(Vec<TableEntry>),

    /// Reply to a data packet that could not be forwarded.
    #[serde(rename = "no route")]
    NoRoute(serde_json::Value),
}

impl Payload {
    /// The wire name of this message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Update(_) => "update",
            Self::Revoke(_) => "revoke",
            Self::Data(_) => "data",
            Self::Dump(_) => "dump",
            Self::Table(_) => "table",
            Self::NoRoute(_) => "no route",
        }
    }
}

/// The body of an update message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateBody {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,

    #[serde(rename = "localpref")]
    pub local_pref: u32,

    #[serde(rename = "selfOrigin")]
    pub self_origin: bool,

    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,

    pub origin: PathOrigin,
}

impl UpdateBody {
    /// This body with the local AS number prepended to the path, the
    /// augmentation applied exactly once both when storing a route and
    /// when readvertising it.
    pub fn augmented(&self, asn: u32) -> UpdateBody {
        let mut as_path = Vec::with_capacity(self.as_path.len() + 1);
        as_path.push(asn);
        as_path.extend_from_slice(&self.as_path);
        UpdateBody {
            as_path,
            ..self.clone()
        }
    }

    /// Convert into a route table entry for a route learned from `peer`.
    /// Fails when the announced netmask is not contiguous.
    pub fn to_route(&self, peer: Ipv4Addr, asn: u32) -> Result<Route, Error> {
        let prefix = Prefix4::from_parts(self.network, self.netmask)?;
        Ok(Route {
            prefix,
            peer,
            local_pref: self.local_pref,
            self_origin: self.self_origin,
            as_path: self.augmented(asn).as_path,
            origin: self.origin,
        })
    }
}

/// One withdrawn prefix within a revoke message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Withdrawal {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl Withdrawal {
    pub fn to_prefix(self) -> Result<Prefix4, Error> {
        Ok(Prefix4::from_parts(self.network, self.netmask)?)
    }
}

/// One row of a table reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableEntry {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub peer: Ipv4Addr,
}

impl From<&Route> for TableEntry {
    fn from(r: &Route) -> Self {
        Self {
            network: r.prefix.value,
            netmask: r.prefix.mask(),
            peer: r.peer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_update() {
        let frame = r#"{
            "src": "192.168.0.2", "dst": "192.168.0.1", "type": "update",
            "msg": {
                "network": "10.0.0.0", "netmask": "255.255.0.0",
                "localpref": 100, "selfOrigin": true,
                "ASPath": [2], "origin": "EGP"
            }
        }"#;

        let envelope: Envelope = serde_json::from_str(frame).unwrap();
        assert_eq!(envelope.src, Ipv4Addr::new(192, 168, 0, 2));
        assert_eq!(envelope.dst, Ipv4Addr::new(192, 168, 0, 1));
        let Payload::Update(body) = envelope.payload else {
            panic!("expected an update");
        };
        assert_eq!(body.network, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(body.netmask, Ipv4Addr::new(255, 255, 0, 0));
        assert_eq!(body.local_pref, 100);
        assert!(body.self_origin);
        assert_eq!(body.as_path, vec![2]);
        assert_eq!(body.origin, PathOrigin::Egp);
    }

    #[test]
    fn test_no_route_wire_form() {
        let envelope = Envelope {
            src: Ipv4Addr::new(192, 168, 0, 1),
            dst: Ipv4Addr::new(10, 0, 0, 25),
            payload: Payload::NoRoute(json!({})),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "no route");
        assert_eq!(value["msg"], json!({}));
        assert_eq!(value["src"], "192.168.0.1");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let frame = r#"{"src":"1.2.3.4","dst":"5.6.7.8","type":"open","msg":{}}"#;
        assert!(serde_json::from_str::<Envelope>(frame).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        // No netmask in the update body.
        let frame = r#"{
            "src": "192.168.0.2", "dst": "192.168.0.1", "type": "update",
            "msg": {"network": "10.0.0.0", "localpref": 100,
                    "selfOrigin": false, "ASPath": [], "origin": "IGP"}
        }"#;
        assert!(serde_json::from_str::<Envelope>(frame).is_err());
    }

    #[test]
    fn test_augmented_prepends_once() {
        let body = UpdateBody {
            network: Ipv4Addr::new(10, 0, 0, 0),
            netmask: Ipv4Addr::new(255, 0, 0, 0),
            local_pref: 100,
            self_origin: false,
            as_path: vec![2, 3],
            origin: PathOrigin::Egp,
        };
        assert_eq!(body.augmented(1).as_path, vec![1, 2, 3]);

        let route = body.to_route(Ipv4Addr::new(192, 168, 0, 2), 1).unwrap();
        assert_eq!(route.as_path, vec![1, 2, 3]);
    }

    #[test]
    fn test_revoke_round_trip() {
        let frame = r#"{
            "src": "192.168.0.2", "dst": "192.168.0.1", "type": "revoke",
            "msg": [{"network": "192.0.1.0", "netmask": "255.255.255.0"}]
        }"#;
        let envelope: Envelope = serde_json::from_str(frame).unwrap();
        let Payload::Revoke(withdrawals) = envelope.payload else {
            panic!("expected a revoke");
        };
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(
            withdrawals[0].to_prefix().unwrap(),
            "192.0.1.0/24".parse().unwrap()
        );
    }
}
