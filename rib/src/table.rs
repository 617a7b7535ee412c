// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The route table.
//!
//! An ordered collection of route entries fed from the announcement
//! history. Inserts never deduplicate; the table is kept minimal by
//! coalescing, which merges adjacent prefixes with equal attributes until
//! no mergeable pair remains.

use crate::types::{Prefix4, Route};
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Append an entry. Duplicates are accepted here and resolved by
    /// [`RouteTable::coalesce`].
    pub fn insert(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Remove every entry carrying this exact (network, netmask, peer)
    /// triple. Returns the number of entries removed.
    pub fn remove_matching(
        &mut self,
        prefix: Prefix4,
        peer: Ipv4Addr,
    ) -> usize {
        let before = self.routes.len();
        self.routes
            .retain(|r| !(r.prefix == prefix && r.peer == peer));
        before - self.routes.len()
    }

    /// Longest-prefix lookup. Returns every entry containing `addr` whose
    /// prefix length equals the maximum matching length, or nothing when
    /// no entry matches.
    pub fn lookup(&self, addr: Ipv4Addr) -> Vec<&Route> {
        let matched: Vec<&Route> = self
            .routes
            .iter()
            .filter(|r| r.prefix.contains(addr))
            .collect();

        let longest = match matched.iter().map(|r| r.prefix.length).max() {
            Some(l) => l,
            None => return Vec::new(),
        };

        matched
            .into_iter()
            .filter(|r| r.prefix.length == longest)
            .collect()
    }

    /// Merge mergeable pairs until none remain. Each round removes the
    /// pair from the table and appends the merged entry, then the scan
    /// restarts, so a merge result can immediately merge again with a
    /// third entry. Merging strictly shrinks the table, which bounds the
    /// loop, and mergeability is symmetric, so the fixed point does not
    /// depend on scan order.
    pub fn coalesce(&mut self) {
        while let Some((i, j)) = self.find_mergeable() {
            // j > i, remove back to front so i stays valid
            let b = self.routes.remove(j);
            let a = self.routes.remove(i);
            self.routes.push(Self::merge(a, &b));
        }
    }

    fn find_mergeable(&self) -> Option<(usize, usize)> {
        for i in 0..self.routes.len() {
            for j in (i + 1)..self.routes.len() {
                if Self::mergeable(&self.routes[i], &self.routes[j]) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Two entries merge when their attributes and prefix lengths are
    /// equal and their networks agree in all but the final mask bit.
    /// Exact duplicates, which replay can produce, also merge; the result
    /// is a single copy.
    fn mergeable(a: &Route, b: &Route) -> bool {
        if !a.attrs_eq(b) || a.prefix.length != b.prefix.length {
            return false;
        }
        if a.prefix == b.prefix {
            return true;
        }
        a.prefix.length > 0
            && a.prefix.shorten().value == b.prefix.shorten().value
    }

    fn merge(a: Route, b: &Route) -> Route {
        if a.prefix == b.prefix {
            return a;
        }
        Route {
            prefix: a.prefix.shorten(),
            ..a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PathOrigin;

    fn route(prefix: &str, peer: &str) -> Route {
        Route {
            prefix: prefix.parse().unwrap(),
            peer: peer.parse().unwrap(),
            local_pref: 100,
            self_origin: false,
            as_path: vec![1, 2],
            origin: PathOrigin::Egp,
        }
    }

    #[test]
    fn test_remove_matching() {
        let mut table = RouteTable::new();
        table.insert(route("10.0.0.0/8", "192.168.0.2"));
        table.insert(route("10.0.0.0/8", "192.168.1.2"));
        table.insert(route("10.0.0.0/8", "192.168.0.2"));

        let removed = table.remove_matching(
            "10.0.0.0/8".parse().unwrap(),
            "192.168.0.2".parse().unwrap(),
        );
        assert_eq!(removed, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.iter().next().unwrap().peer,
            "192.168.1.2".parse::<Ipv4Addr>().unwrap()
        );
    }

    #[test]
    fn test_lookup_longest_prefix() {
        let mut table = RouteTable::new();
        table.insert(route("10.0.0.0/8", "192.168.0.2"));
        table.insert(route("10.1.0.0/16", "192.168.1.2"));

        let hits = table.lookup("10.1.2.3".parse().unwrap());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prefix.length, 16);

        let hits = table.lookup("10.2.2.3".parse().unwrap());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prefix.length, 8);

        assert!(table.lookup("11.0.0.1".parse().unwrap()).is_empty());
    }

    #[test]
    fn test_lookup_ties() {
        let mut table = RouteTable::new();
        table.insert(route("10.0.0.0/8", "192.168.0.2"));
        table.insert(route("10.0.0.0/8", "192.168.1.2"));

        let hits = table.lookup("10.1.2.3".parse().unwrap());
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_coalesce_adjacent_pair() {
        let mut table = RouteTable::new();
        table.insert(route("192.0.0.0/24", "192.168.0.2"));
        table.insert(route("192.0.1.0/24", "192.168.0.2"));
        table.coalesce();

        assert_eq!(table.len(), 1);
        let merged = table.iter().next().unwrap();
        assert_eq!(merged.prefix, "192.0.0.0/23".parse().unwrap());
    }

    #[test]
    fn test_coalesce_cascades() {
        // Four /24s collapse all the way to a /22 regardless of arrival
        // order.
        let mut table = RouteTable::new();
        table.insert(route("192.0.2.0/24", "192.168.0.2"));
        table.insert(route("192.0.0.0/24", "192.168.0.2"));
        table.insert(route("192.0.3.0/24", "192.168.0.2"));
        table.insert(route("192.0.1.0/24", "192.168.0.2"));
        table.coalesce();

        assert_eq!(table.len(), 1);
        let merged = table.iter().next().unwrap();
        assert_eq!(merged.prefix, "192.0.0.0/22".parse().unwrap());
    }

    #[test]
    fn test_coalesce_requires_equal_attributes() {
        let mut table = RouteTable::new();
        table.insert(route("192.0.0.0/24", "192.168.0.2"));
        // Same prefix pair but learned from a different peer.
        table.insert(route("192.0.1.0/24", "192.168.1.2"));
        table.coalesce();
        assert_eq!(table.len(), 2);

        let mut table = RouteTable::new();
        table.insert(route("192.0.0.0/24", "192.168.0.2"));
        let mut other = route("192.0.1.0/24", "192.168.0.2");
        other.local_pref = 200;
        table.insert(other);
        table.coalesce();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_coalesce_not_numerically_adjacent() {
        // 192.0.1.0/24 and 192.0.2.0/24 are numerically consecutive but
        // differ above the final mask bit, so they must not merge.
        let mut table = RouteTable::new();
        table.insert(route("192.0.1.0/24", "192.168.0.2"));
        table.insert(route("192.0.2.0/24", "192.168.0.2"));
        table.coalesce();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_coalesce_deduplicates() {
        let mut table = RouteTable::new();
        table.insert(route("10.0.0.0/8", "192.168.0.2"));
        table.insert(route("10.0.0.0/8", "192.168.0.2"));
        table.coalesce();
        assert_eq!(table.len(), 1);
    }
}
