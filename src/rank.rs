//! Rank-value codec: folds a (tier, division, LP) triple into one monotonic
//! integer so two rank states can be subtracted to get an LP-equivalent delta.
//!
//! Sub-apex tiers encode as `tier * 400 + division * 100 + lp`; the three
//! apex tiers have no divisions and encode as a flat base plus raw LP. The
//! multipliers exceed the max LP within a division (100) and the division
//! count (4), so higher skill always encodes strictly higher.

/// Any apex value must exceed any sub-apex value.
/// Max sub-apex: Diamond I 100 LP = 6*400 + 3*100 + 100 = 2800.
pub const APEX_BASE: i32 = 2800;

const TIER_STEP: i32 = 400;
const DIVISION_STEP: i32 = 100;

/// Values <= 0 mean "unranked / no data" and never take part in attribution.
pub const UNRANKED: i32 = 0;

const SUB_APEX_TIERS: [&str; 7] = [
    "IRON", "BRONZE", "SILVER", "GOLD", "PLATINUM", "EMERALD", "DIAMOND",
];
const DIVISIONS: [&str; 4] = ["IV", "III", "II", "I"];

// Apex tiers share one continuous LP range; decode splits it at these points.
const GRANDMASTER_CUTOFF: i32 = 200;
const CHALLENGER_CUTOFF: i32 = 500;

fn tier_rank(tier: &str) -> i32 {
    SUB_APEX_TIERS
        .iter()
        .position(|t| t.eq_ignore_ascii_case(tier))
        .map(|i| i as i32)
        .unwrap_or(0)
}

fn division_rank(division: &str) -> i32 {
    DIVISIONS
        .iter()
        .position(|d| d.eq_ignore_ascii_case(division))
        .map(|i| i as i32)
        .unwrap_or(0)
}

fn is_apex(tier: &str) -> bool {
    tier.eq_ignore_ascii_case("MASTER")
        || tier.eq_ignore_ascii_case("GRANDMASTER")
        || tier.eq_ignore_ascii_case("CHALLENGER")
}

/// Encode a rank state as one comparable integer.
///
/// Unknown tier/division strings degrade to rank 0 rather than failing, so a
/// surprising API payload produces a low value instead of an error.
pub fn encode(tier: &str, division: &str, league_points: i32) -> i32 {
    if is_apex(tier) {
        APEX_BASE + league_points
    } else {
        tier_rank(tier) * TIER_STEP + division_rank(division) * DIVISION_STEP + league_points
    }
}

/// Invert `encode` for display. Apex values map back to a tier by their
/// position inside the shared apex LP range; apex divisions decode as "".
pub fn decode(value: i32) -> (&'static str, &'static str, i32) {
    if value >= APEX_BASE {
        let lp = value - APEX_BASE;
        let tier = if lp < GRANDMASTER_CUTOFF {
            "MASTER"
        } else if lp < CHALLENGER_CUTOFF {
            "GRANDMASTER"
        } else {
            "CHALLENGER"
        };
        return (tier, "", lp);
    }

    let value = value.max(0);
    let tier_idx = (value / TIER_STEP).min(SUB_APEX_TIERS.len() as i32 - 1);
    let rest = value - tier_idx * TIER_STEP;
    let div_idx = (rest / DIVISION_STEP).min(DIVISIONS.len() as i32 - 1);
    let lp = rest - div_idx * DIVISION_STEP;

    (
        SUB_APEX_TIERS[tier_idx as usize],
        DIVISIONS[div_idx as usize],
        lp,
    )
}

/// Human-readable rank, e.g. "Gold II 45 LP" or "Master 312 LP".
pub fn format_value(value: i32) -> String {
    if value <= UNRANKED {
        return "Unranked".to_string();
    }
    let (tier, division, lp) = decode(value);
    let tier_pretty = format!(
        "{}{}",
        &tier[..1],
        tier[1..].to_lowercase()
    );
    if division.is_empty() {
        format!("{} {} LP", tier_pretty, lp)
    } else {
        format!("{} {} {} LP", tier_pretty, division, lp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_values() {
        assert_eq!(encode("IRON", "IV", 0), 0);
        assert_eq!(encode("IRON", "III", 0), 100);
        assert_eq!(encode("BRONZE", "IV", 0), 400);
        assert_eq!(encode("GOLD", "II", 45), 3 * 400 + 2 * 100 + 45);
        assert_eq!(encode("DIAMOND", "I", 99), 6 * 400 + 3 * 100 + 99);
        assert_eq!(encode("MASTER", "", 0), APEX_BASE);
        assert_eq!(encode("CHALLENGER", "", 950), APEX_BASE + 950);
    }

    #[test]
    fn monotonic_across_all_sub_apex_states() {
        // Walk every sub-apex state in ascending skill order and require a
        // strictly increasing encoding (LP 0..=99; 100 is the promo edge).
        let mut prev = -1;
        for tier in SUB_APEX_TIERS {
            for division in DIVISIONS {
                for lp in 0..=99 {
                    let v = encode(tier, division, lp);
                    assert!(
                        v > prev,
                        "{} {} {} LP encoded {} <= previous {}",
                        tier,
                        division,
                        lp,
                        v,
                        prev
                    );
                    prev = v;
                }
            }
        }
        // Every apex value beats every sub-apex value.
        assert!(encode("MASTER", "", 0) > prev);
    }

    #[test]
    fn round_trip_sub_apex() {
        for tier in SUB_APEX_TIERS {
            for division in DIVISIONS {
                for lp in [0, 1, 42, 99] {
                    let (t, d, l) = decode(encode(tier, division, lp));
                    assert_eq!((t, d, l), (tier, division, lp));
                }
            }
        }
    }

    #[test]
    fn round_trip_apex_within_cutoffs() {
        for lp in [0, 150, 199] {
            assert_eq!(decode(encode("MASTER", "", lp)), ("MASTER", "", lp));
        }
        for lp in [200, 350, 499] {
            assert_eq!(decode(encode("GRANDMASTER", "", lp)), ("GRANDMASTER", "", lp));
        }
        for lp in [500, 800, 1400] {
            assert_eq!(decode(encode("CHALLENGER", "", lp)), ("CHALLENGER", "", lp));
        }
    }

    #[test]
    fn unknown_strings_degrade_to_rank_zero() {
        assert_eq!(encode("WOOD", "IV", 10), 10);
        assert_eq!(encode("GOLD", "IX", 10), 3 * 400 + 10);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_value(encode("GOLD", "II", 45)), "Gold II 45 LP");
        assert_eq!(format_value(encode("MASTER", "", 12)), "Master 12 LP");
        assert_eq!(format_value(0), "Unranked");
    }
}
