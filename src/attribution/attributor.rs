//! LP attribution: reconcile snapshot polling against match completion
//! times to decide how much LP a single match gained or lost.
//!
//! The match API never reports LP changes, and snapshots arrive on an
//! unrelated schedule, so attribution is a best-effort reconstruction.
//! Three strategies run in order; the first that produces a value wins,
//! and "no strategy applies" is an expected outcome (`None`), not an
//! error. A later pass with more data may succeed where this one didn't.

use crate::rank;
use crate::store::matches::MatchRecord;
use crate::store::snapshots::RankSnapshot;

/// Flat estimate used when the very last match has a snapshot after it but
/// none before. A crude placeholder, not derived from data.
const HEURISTIC_LP: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
    pub lp_change: i32,
    pub pre_game_rank_value: i32,
    pub post_game_rank_value: i32,
}

/// Attributes an LP delta to `target`. `history` is every known match for
/// the player (any queue); `snapshots` is the series for the target's
/// queue, ascending by timestamp.
pub fn attribute(
    target: &MatchRecord,
    history: &[MatchRecord],
    snapshots: &[RankSnapshot],
) -> Option<Attribution> {
    let mut same_queue: Vec<&MatchRecord> = history
        .iter()
        .filter(|m| m.queue_id == target.queue_id)
        .collect();
    same_queue.sort_by_key(|m| m.game_end_timestamp);

    from_bracketing_snapshots(target, &same_queue, snapshots)
        .or_else(|| from_resolved_neighbors(target, &same_queue))
        .or_else(|| from_latest_match(target, &same_queue, snapshots))
}

/// Strategy A: snapshots on both sides of the match pin the delta down.
///
/// When several matches ended between the two snapshots the individual
/// contributions are genuinely undeterminable, so the combined delta goes
/// to the chronologically last of them; the earlier ones stay open for the
/// neighbor strategy on a later pass.
fn from_bracketing_snapshots(
    target: &MatchRecord,
    same_queue: &[&MatchRecord],
    snapshots: &[RankSnapshot],
) -> Option<Attribution> {
    let end = target.game_end_timestamp;
    let before = snapshots
        .iter()
        .filter(|s| s.timestamp < end)
        .max_by_key(|s| s.timestamp)?;
    let after = snapshots
        .iter()
        .filter(|s| s.timestamp > end)
        .min_by_key(|s| s.timestamp)?;

    if before.rank_value <= rank::UNRANKED || after.rank_value <= rank::UNRANKED {
        return None;
    }

    let last_in_window = same_queue
        .iter()
        .filter(|m| {
            m.game_end_timestamp > before.timestamp && m.game_end_timestamp < after.timestamp
        })
        .max_by_key(|m| m.game_end_timestamp)?;

    if last_in_window.match_id != target.match_id {
        return None;
    }

    Some(Attribution {
        lp_change: after.rank_value - before.rank_value,
        pre_game_rank_value: before.rank_value,
        post_game_rank_value: after.rank_value,
    })
}

/// Strategy B: both neighboring matches are already resolved, so the gap
/// between them is this match's delta. This is what lets attribution
/// propagate across repeated passes.
fn from_resolved_neighbors(
    target: &MatchRecord,
    same_queue: &[&MatchRecord],
) -> Option<Attribution> {
    let position = same_queue
        .iter()
        .position(|m| m.match_id == target.match_id)?;

    let previous = same_queue.get(position.checked_sub(1)?)?;
    let next = same_queue.get(position + 1)?;

    let pre = previous.post_game_rank_value?;
    let post = next.pre_game_rank_value?;

    Some(Attribution {
        lp_change: post - pre,
        pre_game_rank_value: pre,
        post_game_rank_value: post,
    })
}

/// Strategy C: the newest match has no later match to bracket against, but
/// a snapshot taken after it tells us where the player ended up.
fn from_latest_match(
    target: &MatchRecord,
    same_queue: &[&MatchRecord],
    snapshots: &[RankSnapshot],
) -> Option<Attribution> {
    let has_later_match = same_queue
        .iter()
        .any(|m| m.game_end_timestamp > target.game_end_timestamp);
    if has_later_match {
        return None;
    }

    let latest = snapshots.iter().max_by_key(|s| s.timestamp)?;
    if latest.timestamp <= target.game_end_timestamp {
        return None;
    }

    let before = snapshots
        .iter()
        .filter(|s| s.timestamp < target.game_end_timestamp)
        .max_by_key(|s| s.timestamp);

    match before {
        Some(before) => Some(Attribution {
            lp_change: latest.rank_value - before.rank_value,
            pre_game_rank_value: before.rank_value,
            post_game_rank_value: latest.rank_value,
        }),
        None => {
            // Nothing observed before the match at all; fall back to a
            // fixed win/loss estimate and synthesize the pre value.
            let estimate = if target.win { HEURISTIC_LP } else { -HEURISTIC_LP };
            Some(Attribution {
                lp_change: estimate,
                pre_game_rank_value: latest.rank_value - estimate,
                post_game_rank_value: latest.rank_value,
            })
        }
    }
}
