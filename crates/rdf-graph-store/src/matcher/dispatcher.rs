//! Matcher Dispatcher (§4.G): builds the 16-slot matcher array once at
//! store open and resolves each bind-pattern to a matcher, falling back
//! through the alternative table when no direct index or pivot applies.

use super::Matcher;
use crate::pattern::{Mask, SLOT_COUNT};

/// The 16-slot matcher array. Built once at open; read-only thereafter
/// (§5: "the matcher array is built once at open and thereafter
/// read-only").
#[derive(Debug, Clone)]
pub struct MatcherTable {
    slots: [Option<Matcher>; SLOT_COUNT],
}

impl MatcherTable {
    /// Build the table for the given set of enabled indexed patterns
    /// (already unioned with the mandatory `"p"`/`"c"`, per `StoreConfig`).
    pub fn build(enabled_patterns: &[Mask]) -> Self {
        let mut slots: [Option<Matcher>; SLOT_COUNT] = std::array::from_fn(|_| None);

        // Slot 0 (the fully-unbound pattern) is always the trivial scan.
        slots[Mask::EMPTY.as_index()] = Some(Matcher::Trivial);

        // Step 1: seed from configuration.
        for &mask in enabled_patterns {
            slots[mask.as_index()] = Some(Matcher::Indexing { mask });
        }

        // Step 2: fill every remaining empty slot with s or o bound.
        for raw in 1..SLOT_COUNT {
            let mask = Mask(raw as u8);
            if slots[mask.as_index()].is_none() && (mask.has_s() || mask.has_o()) {
                slots[mask.as_index()] = Some(Matcher::GraphBased { mask });
            }
        }

        // Step 3: fallback table for whatever's still empty (in practice,
        // only p/c-only combinations with no configured index reach here,
        // since everything with s or o bound was filled in step 2).
        for raw in 1..SLOT_COUNT {
            let mask = Mask(raw as u8);
            if slots[mask.as_index()].is_some() {
                continue;
            }
            let resolved = resolve_fallback(&slots, mask);
            slots[mask.as_index()] = Some(resolved);
        }

        MatcherTable { slots }
    }

    pub fn get(&self, mask: Mask) -> &Matcher {
        self.slots[mask.as_index()]
            .as_ref()
            .expect("every slot is populated by MatcherTable::build")
    }

    /// Every slot 1..15 is non-null after open (§8 invariant).
    pub fn all_slots_populated(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

/// The alternative table (§4.G step 3): for each bind-pattern, the ordered
/// list of subset patterns to try when no direct matcher was assigned.
fn alternatives(pattern: &str) -> &'static [&'static str] {
    match pattern {
        "sp" => &["s", "p"],
        "so" => &["s", "o"],
        "sc" => &["s", "c"],
        "po" => &["o", "p"],
        "pc" => &["p", "c"],
        "oc" => &["o", "c"],
        "spo" => &["so", "sp", "po"],
        "spc" => &["sc", "sp", "pc"],
        "soc" => &["so", "sc", "oc"],
        "poc" => &["po", "oc", "pc"],
        "spoc" => &["spo", "soc", "spc", "poc"],
        _ => &[],
    }
}

fn resolve_fallback(slots: &[Option<Matcher>; SLOT_COUNT], mask: Mask) -> Matcher {
    for alt in alternatives(&mask.pattern_string()) {
        let alt_mask = Mask::from_pattern_string(alt).expect("alternative table entries are valid patterns");
        if let Some(matcher) = &slots[alt_mask.as_index()] {
            return *matcher;
        }
    }
    // Fall back to slot 1 (the s-only graph-based matcher; always populated
    // after step 2, since mask `s` alone has bit 0 set).
    slots[1].expect("slot 1 (s-only) is always populated after step 2")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    #[test]
    fn all_slots_non_null_for_default_config() {
        let cfg = StoreConfig::default();
        let table = MatcherTable::build(&cfg.enabled_patterns().unwrap());
        assert!(table.all_slots_populated());
    }

    #[test]
    fn all_slots_non_null_with_only_p_c_indexed() {
        let cfg = StoreConfig {
            indexed_patterns: "".to_string(),
            ..StoreConfig::default()
        };
        let table = MatcherTable::build(&cfg.enabled_patterns().unwrap());
        assert!(table.all_slots_populated());
    }

    #[test]
    fn pc_falls_back_to_p_when_pc_not_indexed() {
        let cfg = StoreConfig {
            indexed_patterns: "p,c".to_string(),
            ..StoreConfig::default()
        };
        let table = MatcherTable::build(&cfg.enabled_patterns().unwrap());
        let pc = Mask::from_pattern_string("pc").unwrap();
        match table.get(pc) {
            Matcher::Indexing { mask } => assert_eq!(mask.pattern_string(), "p"),
            other => panic!("expected fallback to the p index, got {other:?}"),
        }
    }

    #[test]
    fn patterns_with_s_or_o_are_always_graph_based_unless_indexed() {
        let cfg = StoreConfig {
            indexed_patterns: "p,c".to_string(),
            ..StoreConfig::default()
        };
        let table = MatcherTable::build(&cfg.enabled_patterns().unwrap());
        let spoc = Mask::from_pattern_string("spoc").unwrap();
        match table.get(spoc) {
            Matcher::GraphBased { mask } => assert_eq!(mask.pattern_string(), "spoc"),
            other => panic!("expected graph-based for spoc, got {other:?}"),
        }
    }

    #[test]
    fn explicit_spoc_index_takes_priority_over_graph_based() {
        let cfg = StoreConfig {
            indexed_patterns: "p,c,spoc".to_string(),
            ..StoreConfig::default()
        };
        let table = MatcherTable::build(&cfg.enabled_patterns().unwrap());
        let spoc = Mask::from_pattern_string("spoc").unwrap();
        assert!(matches!(table.get(spoc), Matcher::Indexing { .. }));
    }
}
