// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property-based tests for the prefix arithmetic, coalescing, lookup,
//! and best-path selection invariants.

use crate::bestpath::bestpath;
use crate::table::RouteTable;
use crate::types::{mask_length, PathOrigin, Prefix4, Route};
use proptest::prelude::*;
use std::net::Ipv4Addr;

fn prefix_strategy() -> impl Strategy<Value = Prefix4> {
    (any::<u32>(), 0u8..=32u8)
        .prop_map(|(bits, length)| Prefix4::new(Ipv4Addr::from(bits), length))
}

// A deliberately small attribute space so that generated tables contain
// coalescible and tied entries often enough to matter.
fn route_strategy() -> impl Strategy<Value = Route> {
    (
        (any::<u8>(), 20u8..=26u8),
        0u8..4u8,
        prop::sample::select(vec![100u32, 200]),
        any::<bool>(),
        prop::sample::select(vec![
            vec![2u32],
            vec![2, 3],
            vec![4, 5, 6],
        ]),
        prop::sample::select(vec![
            PathOrigin::Igp,
            PathOrigin::Egp,
            PathOrigin::Unk,
        ]),
    )
        .prop_map(|((net, length), peer, local_pref, self_origin, as_path, origin)| {
            Route {
                prefix: Prefix4::new(
                    Ipv4Addr::new(10, net, 0, 0),
                    length,
                ),
                peer: Ipv4Addr::new(192, 168, peer, 2),
                local_pref,
                self_origin,
                as_path,
                origin,
            }
        })
}

fn table_of(routes: Vec<Route>) -> RouteTable {
    let mut table = RouteTable::new();
    for r in routes {
        table.insert(r);
    }
    table
}

proptest! {
    /// Property: the netmask rendering of a prefix derives back to the
    /// same length.
    #[test]
    fn prop_mask_round_trip(prefix in prefix_strategy()) {
        prop_assert_eq!(mask_length(prefix.mask()), Ok(prefix.length));
    }

    /// Property: a mask with a hole below its leading run is rejected.
    #[test]
    fn prop_holed_mask_rejected(length in 0u8..=30u8, bit in 0u32..30u32) {
        prop_assume!(bit < 31 - u32::from(length));
        let contiguous = match length {
            0 => 0u32,
            n => (!0u32) << (32 - u32::from(n)),
        };
        let holed = Ipv4Addr::from(contiguous | (1 << bit));
        prop_assert!(mask_length(holed).is_err());
    }

    /// Property: host bits are unset after construction, and unsetting
    /// again changes nothing.
    #[test]
    fn prop_host_bits_unset(prefix in prefix_strategy()) {
        prop_assert!(prefix.host_bits_are_unset());
        let mut again = prefix;
        again.unset_host_bits();
        prop_assert_eq!(prefix, again);
    }

    /// Property: coalescing is idempotent.
    #[test]
    fn prop_coalesce_idempotent(routes in prop::collection::vec(route_strategy(), 0..12)) {
        let mut once = table_of(routes);
        once.coalesce();
        let mut twice = once.clone();
        twice.coalesce();
        prop_assert_eq!(once, twice);
    }

    /// Property: an address is covered by the coalesced table exactly
    /// when it was covered before coalescing.
    #[test]
    fn prop_coalesce_preserves_coverage(
        routes in prop::collection::vec(route_strategy(), 0..12),
        addr in any::<u32>(),
    ) {
        let addr = Ipv4Addr::from(addr);
        let table = table_of(routes);
        let mut coalesced = table.clone();
        coalesced.coalesce();

        let covered_before = table.iter().any(|r| r.prefix.contains(addr));
        let covered_after =
            coalesced.iter().any(|r| r.prefix.contains(addr));
        prop_assert_eq!(covered_before, covered_after);
    }

    /// Property: merging one adjacent pair yields a prefix covering
    /// exactly the union of the pair.
    #[test]
    fn prop_merge_covers_union(
        net in any::<u32>(),
        length in 1u8..=32u8,
        addr in any::<u32>(),
    ) {
        let low = Prefix4::new(Ipv4Addr::from(net), length).shorten();
        let low = Prefix4::new(low.value, length);
        let final_bit = 1u32 << (32 - u32::from(length));
        let high =
            Prefix4::new(Ipv4Addr::from(low.value.to_bits() | final_bit), length);

        let route = |prefix| Route {
            prefix,
            peer: Ipv4Addr::new(192, 168, 0, 2),
            local_pref: 100,
            self_origin: false,
            as_path: vec![2],
            origin: PathOrigin::Egp,
        };

        let mut table = table_of(vec![route(low), route(high)]);
        table.coalesce();
        prop_assert_eq!(table.len(), 1);
        let merged = table.iter().next().unwrap();

        let addr = Ipv4Addr::from(addr);
        prop_assert_eq!(
            merged.prefix.contains(addr),
            low.contains(addr) || high.contains(addr)
        );
    }

    /// Property: lookup returns only entries that contain the address
    /// and whose length is the maximum over all containing entries.
    #[test]
    fn prop_lookup_longest_dominates(
        routes in prop::collection::vec(route_strategy(), 0..12),
        addr in any::<u32>(),
    ) {
        let addr = Ipv4Addr::from(addr);
        let table = table_of(routes);
        let hits = table.lookup(addr);

        let longest = table
            .iter()
            .filter(|r| r.prefix.contains(addr))
            .map(|r| r.prefix.length)
            .max();
        match longest {
            None => prop_assert!(hits.is_empty()),
            Some(longest) => {
                prop_assert!(!hits.is_empty());
                for hit in hits {
                    prop_assert!(hit.prefix.contains(addr));
                    prop_assert_eq!(hit.prefix.length, longest);
                }
            }
        }
    }

    /// Property: any non-empty candidate set yields exactly one winner.
    #[test]
    fn prop_selection_deterministic(routes in prop::collection::vec(route_strategy(), 1..8)) {
        let candidates: Vec<&Route> = routes.iter().collect();
        let first = bestpath(candidates.clone());
        prop_assert!(first.is_some());

        // Same input, same winner.
        let second = bestpath(candidates);
        prop_assert_eq!(first, second);
    }
}
