// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::types::Route;
use itertools::Itertools;

/// Select the best route from a set of longest-prefix candidates.
///
/// Each stage keeps the candidates that are extremal for its criterion,
/// so a stage can never empty a non-empty set. The final stage orders by
/// the numeric neighbor address, which is total over distinct neighbors,
/// leaving exactly one winner.
pub fn bestpath(candidates: Vec<&Route>) -> Option<&Route> {
    if candidates.is_empty() {
        return None;
    }

    // Highest local preference wins
    let candidates = candidates.into_iter().max_set_by_key(|r| r.local_pref);

    // Prefer routes the advertising router originated itself. If none
    // were, the whole set stays in play.
    let (originated, relayed): (Vec<&Route>, Vec<&Route>) =
        candidates.into_iter().partition(|r| r.self_origin);
    let candidates = match originated.len() {
        0 => relayed,
        _ => originated,
    };

    // Shortest AS path
    let candidates =
        candidates.into_iter().min_set_by_key(|r| r.as_path.len());

    // Best origin class, IGP over EGP over UNK
    let candidates = candidates.into_iter().min_set_by_key(|r| r.origin);

    // Lowest neighbor address breaks any remaining tie
    candidates.into_iter().min_by_key(|r| r.peer)
}
