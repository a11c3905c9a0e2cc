//! Applies the attributor across a player's full match list.
//!
//! Only matches still missing an LP delta are touched; anything already
//! attributed is final. Because results written earlier in a pass are
//! visible to later iterations, neighbor-based attribution can cascade
//! within a single pass as well as across passes.

use crate::attribution::attributor;
use crate::store::matches::MatchRecord;
use crate::store::snapshots::RankSnapshot;
use std::collections::BTreeMap;

/// Fills LP fields in place for every match that can be attributed with
/// the data at hand. Returns how many matches were newly attributed.
/// Running this twice over the same input is a no-op the second time.
pub fn process(
    matches: &mut Vec<MatchRecord>,
    snapshots_by_queue: &BTreeMap<i32, Vec<RankSnapshot>>,
) -> usize {
    // Most recent first, matching how histories are stored and displayed.
    let mut order: Vec<usize> = (0..matches.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(matches[i].game_end_timestamp));

    let empty: Vec<RankSnapshot> = Vec::new();
    let mut attributed = 0;

    for i in order {
        if matches[i].is_attributed() {
            continue;
        }
        let snapshots = snapshots_by_queue
            .get(&matches[i].queue_id)
            .unwrap_or(&empty);

        if let Some(result) = attributor::attribute(&matches[i], matches, snapshots) {
            let m = &mut matches[i];
            m.lp_change_this_game = Some(result.lp_change);
            m.pre_game_rank_value = Some(result.pre_game_rank_value);
            m.post_game_rank_value = Some(result.post_game_rank_value);
            attributed += 1;
        }
    }

    attributed
}
